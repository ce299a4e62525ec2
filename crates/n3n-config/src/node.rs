use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node placed in a flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowNode {
  #[serde(default)]
  pub id: String,
  /// Handler type identifier, e.g. "condition" or "text".
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub node_type: Option<String>,
  /// Editor layout data. Passed through untouched.
  #[serde(default)]
  pub position: Map<String, Value>,
  #[serde(default)]
  pub data: Map<String, Value>,
}

impl FlowNode {
  pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      node_type: Some(node_type.into()),
      ..Default::default()
    }
  }

  pub fn with_data(mut self, data: Map<String, Value>) -> Self {
    self.data = data;
    self
  }

  /// Handler configuration for this node.
  ///
  /// Editor-produced nodes nest it under `data.config`; older definitions
  /// put the keys directly in `data`.
  pub fn config(&self) -> Map<String, Value> {
    match self.data.get("config") {
      Some(Value::Object(config)) => config.clone(),
      _ => self.data.clone(),
    }
  }
}
