use serde_json::{Map, Value};

use crate::error::HandlerError;

/// Operation parameters extracted from node config.
///
/// Accessors coerce the shapes config values arrive in (strings, numbers,
/// stringified numbers) with one defaulting policy: absent, `null` or
/// unparseable values fall back to the supplied default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
  pub fn new(values: Map<String, Value>) -> Self {
    Self(values)
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.0.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn into_inner(self) -> Map<String, Value> {
    self.0
  }

  /// True when the value is absent, `null` or an empty string.
  pub fn is_missing(&self, name: &str) -> bool {
    is_blank(self.0.get(name))
  }

  pub fn required_str(&self, name: &str) -> Result<String, HandlerError> {
    match self.0.get(name) {
      Some(value) if !is_blank(Some(value)) => Ok(value_to_string(value)),
      _ => Err(HandlerError::MissingParameter {
        name: name.to_string(),
      }),
    }
  }

  pub fn str_or(&self, name: &str, default: &str) -> String {
    match self.0.get(name) {
      Some(value) if !is_blank(Some(value)) => value_to_string(value),
      _ => default.to_string(),
    }
  }

  pub fn i64_or(&self, name: &str, default: i64) -> i64 {
    match self.0.get(name) {
      Some(Value::Number(n)) => n
        .as_i64()
        .or_else(|| n.as_f64().map(|f| f as i64))
        .unwrap_or(default),
      Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
      _ => default,
    }
  }

  /// Integer that must be present and parse; unlike `i64_or` nothing is
  /// defaulted.
  pub fn required_i64(&self, name: &str) -> Result<i64, HandlerError> {
    let value = match self.0.get(name) {
      Some(value) if !is_blank(Some(value)) => value,
      _ => {
        return Err(HandlerError::MissingParameter {
          name: name.to_string(),
        });
      }
    };
    let parsed = match value {
      Value::Number(n) => n.as_i64().or_else(|| {
        n.as_f64()
          .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
          .map(|f| f as i64)
      }),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    };
    parsed.ok_or_else(|| {
      HandlerError::invalid(name, format!("expected an integer, got {}", value_to_string(value)))
    })
  }

  pub fn f64_or(&self, name: &str, default: f64) -> f64 {
    match self.0.get(name) {
      Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
      Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
      _ => default,
    }
  }

  /// Booleans pass through; strings are true iff they equal `"true"`
  /// ignoring case; other values are false.
  pub fn bool_or(&self, name: &str, default: bool) -> bool {
    match self.0.get(name) {
      None | Some(Value::Null) => default,
      Some(Value::Bool(b)) => *b,
      Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
      Some(_) => false,
    }
  }

  /// The list under `name`, or an empty slice for anything else.
  pub fn list(&self, name: &str) -> &[Value] {
    self
      .0
      .get(name)
      .and_then(Value::as_array)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// The map under `name`, or an empty map for anything else.
  pub fn map(&self, name: &str) -> Map<String, Value> {
    self
      .0
      .get(name)
      .and_then(Value::as_object)
      .cloned()
      .unwrap_or_default()
  }
}

impl From<Map<String, Value>> for Params {
  fn from(values: Map<String, Value>) -> Self {
    Self(values)
  }
}

/// Resolved credential payload. Empty when none was configured or resolution
/// failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credential(Map<String, Value>);

impl Credential {
  pub fn new(values: Map<String, Value>) -> Self {
    Self(values)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  /// String form of a credential field, `None` when absent or `null`.
  pub fn get(&self, key: &str) -> Option<String> {
    match self.0.get(key) {
      None | Some(Value::Null) => None,
      Some(value) => Some(value_to_string(value)),
    }
  }

  pub fn required(&self, key: &str) -> Result<String, HandlerError> {
    self
      .get(key)
      .filter(|v| !v.is_empty())
      .ok_or_else(|| HandlerError::MissingCredential {
        field: key.to_string(),
      })
  }
}

pub(crate) fn is_blank(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

/// Strings without quotes, everything else as JSON.
pub(crate) fn value_to_string(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn params(value: Value) -> Params {
    match value {
      Value::Object(map) => Params::new(map),
      _ => panic!("expected an object"),
    }
  }

  #[test]
  fn test_required_str() {
    let p = params(json!({ "a": "x", "b": "", "c": null, "d": 5 }));
    assert_eq!(p.required_str("a").unwrap(), "x");
    assert_eq!(p.required_str("d").unwrap(), "5");
    for name in ["b", "c", "missing"] {
      let err = p.required_str(name).unwrap_err();
      assert_eq!(err.to_string(), format!("Required parameter '{}' is missing", name));
    }
  }

  #[test]
  fn test_str_or() {
    let p = params(json!({ "a": "x", "b": "" }));
    assert_eq!(p.str_or("a", "d"), "x");
    assert_eq!(p.str_or("b", "d"), "d");
    assert_eq!(p.str_or("z", "d"), "d");
  }

  #[test]
  fn test_numeric_coercion() {
    let p = params(json!({ "int": 7, "float": 2.9, "text": "12", "junk": "abc", "flag": true }));
    assert_eq!(p.i64_or("int", 0), 7);
    assert_eq!(p.i64_or("float", 0), 2);
    assert_eq!(p.i64_or("text", 0), 12);
    assert_eq!(p.i64_or("junk", 3), 3);
    assert_eq!(p.i64_or("flag", 3), 3);
    assert_eq!(p.f64_or("float", 0.0), 2.9);
    assert_eq!(p.f64_or("text", 0.0), 12.0);
    assert_eq!(p.f64_or("missing", 1.5), 1.5);
  }

  #[test]
  fn test_required_i64_rejects_junk() {
    let p = params(json!({ "int": 7, "float": 2.9, "text": " 12 ", "junk": "abc", "flag": true, "empty": "" }));
    assert_eq!(p.required_i64("int").unwrap(), 7);
    assert_eq!(p.required_i64("float").unwrap(), 2);
    assert_eq!(p.required_i64("text").unwrap(), 12);
    assert_eq!(
      p.required_i64("junk").unwrap_err().to_string(),
      "Invalid parameter 'junk': expected an integer, got abc"
    );
    assert!(matches!(
      p.required_i64("flag"),
      Err(HandlerError::InvalidParameter { .. })
    ));
    for name in ["empty", "missing"] {
      assert!(matches!(
        p.required_i64(name),
        Err(HandlerError::MissingParameter { .. })
      ));
    }
  }

  #[test]
  fn test_bool_coercion() {
    let p = params(json!({ "t": true, "s": "TRUE", "n": "no", "num": 1, "null": null }));
    assert!(p.bool_or("t", false));
    assert!(p.bool_or("s", false));
    assert!(!p.bool_or("n", true));
    assert!(!p.bool_or("num", true));
    assert!(p.bool_or("null", true));
    assert!(p.bool_or("missing", true));
  }

  #[test]
  fn test_collections_fall_back_to_empty() {
    let p = params(json!({ "items": [1, 2], "obj": { "k": "v" }, "str": "x" }));
    assert_eq!(p.list("items"), &[json!(1), json!(2)]);
    assert!(p.list("str").is_empty());
    assert_eq!(p.map("obj").get("k"), Some(&json!("v")));
    assert!(p.map("items").is_empty());
  }

  #[test]
  fn test_credential_fields() {
    let mut map = Map::new();
    map.insert("token".into(), json!("abc"));
    map.insert("empty".into(), json!(""));
    map.insert("port".into(), json!(6379));
    let credential = Credential::new(map);

    assert_eq!(credential.get("token").as_deref(), Some("abc"));
    assert_eq!(credential.get("port").as_deref(), Some("6379"));
    assert!(credential.get("missing").is_none());
    assert_eq!(credential.required("token").unwrap(), "abc");
    assert_eq!(
      credential.required("empty").unwrap_err().to_string(),
      "Credential field 'empty' is required"
    );
  }
}
