use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured outcome of one node invocation.
///
/// Handlers never raise for business failures. They return a result with
/// `success == false` and an error message instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionResult {
  pub success: bool,
  #[serde(default)]
  pub output: Value,
  /// Present iff `success` is false.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  /// Edge labels, source handles or target ids the orchestrator should
  /// follow next. `None` means every eligible edge.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub branches_to_follow: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_time_ms: Option<u64>,
}

impl NodeExecutionResult {
  pub fn success(output: Value) -> Self {
    Self {
      success: true,
      output,
      error_message: None,
      branches_to_follow: None,
      execution_time_ms: None,
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      output: Value::Null,
      error_message: Some(message.into()),
      branches_to_follow: None,
      execution_time_ms: None,
    }
  }

  pub fn with_branches<I, S>(mut self, branches: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.branches_to_follow = Some(branches.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
    self.execution_time_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    self
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_success_has_no_error() {
    let result = NodeExecutionResult::success(json!({ "ok": true }));
    assert!(result.success);
    assert!(result.error_message.is_none());
  }

  #[test]
  fn test_failure_carries_message() {
    let result = NodeExecutionResult::failure("boom");
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("boom"));
    assert_eq!(result.output, Value::Null);
  }

  #[test]
  fn test_branches_and_timing_serialize() {
    let result = NodeExecutionResult::success(json!(1))
      .with_branches(["true"])
      .with_execution_time(Duration::from_millis(12));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["branchesToFollow"], json!(["true"]));
    assert_eq!(value["executionTimeMs"], json!(12));
    assert!(value.get("errorMessage").is_none());
  }
}
