use serde_json::{Map, Value};

use crate::multiop::field::{FieldDef, insert_opt};

/// A named group of operations, e.g. "message" or "channel".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDef {
  pub name: String,
  pub display_name: String,
  pub description: Option<String>,
  pub icon: Option<String>,
}

impl ResourceDef {
  pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      display_name: display_name.into(),
      description: None,
      icon: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
    self.icon = Some(icon.into());
    self
  }

  pub(crate) fn to_definition(&self) -> Value {
    let mut def = Map::new();
    def.insert("name".into(), self.name.clone().into());
    def.insert("displayName".into(), self.display_name.clone().into());
    insert_opt(&mut def, "description", self.description.clone());
    insert_opt(&mut def, "icon", self.icon.clone());
    Value::Object(def)
  }
}

/// One action within a resource, with its dynamic fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDef {
  pub name: String,
  pub display_name: String,
  pub description: Option<String>,
  pub fields: Vec<FieldDef>,
  /// Defaults to true.
  pub requires_credential: bool,
  pub output_description: Option<String>,
}

impl OperationDef {
  pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      display_name: display_name.into(),
      description: None,
      fields: Vec::new(),
      requires_credential: true,
      output_description: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_field(mut self, field: FieldDef) -> Self {
    self.fields.push(field);
    self
  }

  pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
    self.fields.extend(fields);
    self
  }

  pub fn without_credential(mut self) -> Self {
    self.requires_credential = false;
    self
  }

  pub fn with_output_description(mut self, description: impl Into<String>) -> Self {
    self.output_description = Some(description.into());
    self
  }

  pub fn field(&self, name: &str) -> Option<&FieldDef> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// Entry for `x-operation-definitions`, tagged with the owning resource.
  pub fn to_definition(&self, resource: &str) -> Value {
    let mut def = Map::new();
    def.insert("name".into(), self.name.clone().into());
    def.insert("displayName".into(), self.display_name.clone().into());
    def.insert("resource".into(), resource.into());
    insert_opt(&mut def, "description", self.description.clone());
    if !self.fields.is_empty() {
      def.insert(
        "fields".into(),
        Value::Array(self.fields.iter().map(FieldDef::to_definition).collect()),
      );
    }
    def.insert("requiresCredential".into(), self.requires_credential.into());
    insert_opt(&mut def, "outputDescription", self.output_description.clone());
    Value::Object(def)
  }
}
