use serde::{Deserialize, Serialize};

/// A single problem found while validating a config or expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
  pub field: String,
  pub message: String,
}

/// Outcome of a pre-flight check. Valid iff there are no errors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
  pub errors: Vec<ValidationError>,
}

impl ValidationResult {
  pub fn valid() -> Self {
    Self::default()
  }

  pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    let mut result = Self::default();
    result.add_error(field, message);
    result
  }

  pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.errors.push(ValidationError {
      field: field.into(),
      message: message.into(),
    });
  }

  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  /// All messages joined with `"; "`.
  pub fn summary(&self) -> String {
    self
      .errors
      .iter()
      .map(|e| e.message.as_str())
      .collect::<Vec<_>>()
      .join("; ")
  }
}
