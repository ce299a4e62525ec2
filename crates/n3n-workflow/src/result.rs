use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Outcome of validating a flow definition.
///
/// Recomputed on every parse. Errors make the result invalid; warnings never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
  pub valid: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
  /// Nodes with no incoming edges.
  pub entry_points: Vec<String>,
  /// Nodes with no outgoing edges.
  pub exit_points: Vec<String>,
  /// One valid topological order. Empty unless the graph is a DAG.
  pub execution_order: Vec<String>,
  /// node_id -> nodes that must complete before it, from every valid edge
  /// regardless of edge type.
  pub dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ParseResult {
  pub fn new() -> Self {
    Self {
      valid: true,
      errors: Vec::new(),
      warnings: Vec::new(),
      entry_points: Vec::new(),
      exit_points: Vec::new(),
      execution_order: Vec::new(),
      dependencies: BTreeMap::new(),
    }
  }

  pub fn add_error(&mut self, error: impl Into<String>) {
    self.errors.push(error.into());
    self.valid = false;
  }

  pub fn add_warning(&mut self, warning: impl Into<String>) {
    self.warnings.push(warning.into());
  }

  /// Direct prerequisites of a node.
  pub fn dependencies_of(&self, node_id: &str) -> Option<&BTreeSet<String>> {
    self.dependencies.get(node_id)
  }

  /// Nodes whose prerequisites are all in `completed` and which are not
  /// completed themselves.
  ///
  /// Returned nodes have no dependency path between them and may run in
  /// parallel.
  pub fn ready_nodes(&self, completed: &BTreeSet<String>) -> Vec<String> {
    self
      .execution_order
      .iter()
      .filter(|id| !completed.contains(*id))
      .filter(|id| {
        self
          .dependencies
          .get(*id)
          .is_none_or(|deps| deps.is_subset(completed))
      })
      .cloned()
      .collect()
  }
}

impl Default for ParseResult {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_result_is_valid() {
    let result = ParseResult::new();
    assert!(result.valid);
    assert!(result.errors.is_empty());
  }

  #[test]
  fn test_error_invalidates_warning_does_not() {
    let mut result = ParseResult::new();
    result.add_warning("odd");
    assert!(result.valid);

    result.add_error("broken");
    assert!(!result.valid);
    assert_eq!(result.errors, vec!["broken"]);
    assert_eq!(result.warnings, vec!["odd"]);
  }

  #[test]
  fn test_ready_nodes() {
    let mut result = ParseResult::new();
    result.execution_order = vec!["a".into(), "b".into(), "c".into(), "d".into()];
    result.dependencies.insert("a".into(), BTreeSet::new());
    result
      .dependencies
      .insert("b".into(), BTreeSet::from(["a".to_string()]));
    result
      .dependencies
      .insert("c".into(), BTreeSet::from(["a".to_string()]));
    result.dependencies.insert(
      "d".into(),
      BTreeSet::from(["b".to_string(), "c".to_string()]),
    );

    assert_eq!(result.ready_nodes(&BTreeSet::new()), vec!["a"]);

    let completed = BTreeSet::from(["a".to_string()]);
    assert_eq!(result.ready_nodes(&completed), vec!["b", "c"]);

    let completed = BTreeSet::from(["a".to_string(), "b".to_string()]);
    assert_eq!(result.ready_nodes(&completed), vec!["c"]);
  }

  #[test]
  fn test_serializes_camel_case() {
    let value = serde_json::to_value(ParseResult::new()).unwrap();
    assert!(value.get("entryPoints").is_some());
    assert!(value.get("executionOrder").is_some());
  }
}
