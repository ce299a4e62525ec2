use serde_json::{Map, Value};

/// JSON type of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  String,
  Integer,
  Number,
  Boolean,
  Array,
  Object,
}

impl FieldKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      FieldKind::String => "string",
      FieldKind::Integer => "integer",
      FieldKind::Number => "number",
      FieldKind::Boolean => "boolean",
      FieldKind::Array => "array",
      FieldKind::Object => "object",
    }
  }
}

/// A dynamic configuration field of one operation.
///
/// Built with the constructors below and refined with the `with_*`
/// modifiers:
///
/// ```
/// use n3n_handler::multiop::FieldDef;
///
/// let timeout = FieldDef::integer("timeout", "Timeout (ms)")
///   .with_default(1000)
///   .with_range(0, 60_000);
/// assert_eq!(timeout.to_json_schema()["default"], 1000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
  pub name: String,
  pub display_name: String,
  pub description: Option<String>,
  pub kind: FieldKind,
  /// UI hint such as `textarea`, `code`, `password` or `credential`.
  pub format: Option<String>,
  pub required: bool,
  pub default: Option<Value>,
  pub options: Option<Vec<String>>,
  /// Display labels, parallel to `options`.
  pub option_labels: Option<Vec<String>>,
  pub minimum: Option<Value>,
  pub maximum: Option<Value>,
  pub placeholder: Option<String>,
  /// Item definition for array fields.
  pub items: Option<Box<FieldDef>>,
}

impl FieldDef {
  pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: FieldKind) -> Self {
    Self {
      name: name.into(),
      display_name: display_name.into(),
      description: None,
      kind,
      format: None,
      required: false,
      default: None,
      options: None,
      option_labels: None,
      minimum: None,
      maximum: None,
      placeholder: None,
      items: None,
    }
  }

  pub fn string(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::new(name, display_name, FieldKind::String)
  }

  pub fn textarea(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::string(name, display_name).with_format("textarea")
  }

  pub fn code(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::string(name, display_name).with_format("code")
  }

  pub fn password(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::string(name, display_name).with_format("password")
  }

  pub fn credential(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::string(name, display_name).with_format("credential")
  }

  pub fn integer(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::new(name, display_name, FieldKind::Integer)
  }

  pub fn number(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::new(name, display_name, FieldKind::Number)
  }

  pub fn boolean(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::new(name, display_name, FieldKind::Boolean)
  }

  pub fn select<I, S>(name: impl Into<String>, display_name: impl Into<String>, options: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::string(name, display_name).with_options(options)
  }

  pub fn json(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self::new(name, display_name, FieldKind::Object).with_format("json")
  }

  pub fn array(name: impl Into<String>, display_name: impl Into<String>, items: FieldDef) -> Self {
    let mut field = Self::new(name, display_name, FieldKind::Array);
    field.items = Some(Box::new(items));
    field
  }

  pub fn multi_select<I, S>(
    name: impl Into<String>,
    display_name: impl Into<String>,
    options: I,
  ) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(name, display_name, FieldKind::Array)
      .with_format("multiselect")
      .with_options(options)
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn optional(mut self) -> Self {
    self.required = false;
    self
  }

  pub fn with_default(mut self, value: impl Into<Value>) -> Self {
    self.default = Some(value.into());
    self
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
    self.placeholder = Some(placeholder.into());
    self
  }

  pub fn with_range(mut self, minimum: impl Into<Value>, maximum: impl Into<Value>) -> Self {
    self.minimum = Some(minimum.into());
    self.maximum = Some(maximum.into());
    self
  }

  pub fn with_options<I, S>(mut self, options: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.options = Some(options.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_option_labels<I, S>(mut self, labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.option_labels = Some(labels.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_format(mut self, format: impl Into<String>) -> Self {
    self.format = Some(format.into());
    self
  }

  /// JSON Schema property for this field.
  pub fn to_json_schema(&self) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), self.kind.as_str().into());
    schema.insert("title".into(), self.display_name.clone().into());
    insert_opt(&mut schema, "description", self.description.clone());
    insert_opt(&mut schema, "format", self.format.clone());
    insert_opt(&mut schema, "default", self.default.clone());

    if let Some(options) = self.options.as_ref().filter(|o| !o.is_empty()) {
      schema.insert("enum".into(), options.clone().into());
      if let Some(labels) = self.option_labels.as_ref().filter(|l| !l.is_empty()) {
        schema.insert("enumNames".into(), labels.clone().into());
      }
    }

    insert_opt(&mut schema, "minimum", self.minimum.clone());
    insert_opt(&mut schema, "maximum", self.maximum.clone());
    insert_opt(&mut schema, "x-placeholder", self.placeholder.clone());
    if let Some(items) = &self.items {
      schema.insert("items".into(), items.to_json_schema());
    }

    Value::Object(schema)
  }

  /// Flat description used inside `x-operation-definitions`.
  pub fn to_definition(&self) -> Value {
    let mut def = Map::new();
    def.insert("name".into(), self.name.clone().into());
    def.insert("displayName".into(), self.display_name.clone().into());
    def.insert("type".into(), self.kind.as_str().into());
    def.insert("required".into(), self.required.into());
    insert_opt(&mut def, "format", self.format.clone());
    insert_opt(&mut def, "default", self.default.clone());
    insert_opt(&mut def, "options", self.options.clone());
    insert_opt(&mut def, "optionLabels", self.option_labels.clone());
    insert_opt(&mut def, "description", self.description.clone());
    insert_opt(&mut def, "placeholder", self.placeholder.clone());
    insert_opt(&mut def, "minimum", self.minimum.clone());
    insert_opt(&mut def, "maximum", self.maximum.clone());
    Value::Object(def)
  }
}

pub(crate) fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
  if let Some(value) = value {
    map.insert(key.to_string(), value.into());
  }
}
