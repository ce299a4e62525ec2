use async_trait::async_trait;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::HandlerError;

/// An input or output port of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDef {
  pub name: String,
  #[serde(rename = "type")]
  pub port_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub required: Option<bool>,
}

impl PortDef {
  pub fn input(name: impl Into<String>, port_type: impl Into<String>, required: bool) -> Self {
    Self {
      name: name.into(),
      port_type: port_type.into(),
      required: Some(required),
    }
  }

  pub fn output(name: impl Into<String>, port_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      port_type: port_type.into(),
      required: None,
    }
  }
}

/// Ports a node exposes for wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
  pub inputs: Vec<PortDef>,
  pub outputs: Vec<PortDef>,
}

impl Default for InterfaceDefinition {
  /// One optional `input` and one `output`, both untyped.
  fn default() -> Self {
    Self {
      inputs: vec![PortDef::input("input", "any", false)],
      outputs: vec![PortDef::output("output", "any")],
    }
  }
}

/// `{"type": "object", "properties": {}}`
pub fn empty_object_schema() -> Value {
  json!({ "type": "object", "properties": {} })
}

/// Behaviour bound to one node type.
///
/// Implementations report business failures as
/// `Ok(NodeExecutionResult::failure(..))` and may return `Err` for anything
/// else. Callers go through [`execute_node`](crate::execute_node), which
/// resolves expressions, validates config and converts errors and panics into
/// failure results.
#[async_trait]
pub trait NodeHandler: Send + Sync {
  /// Stable type identifier, e.g. `"text"`.
  fn node_type(&self) -> &str;

  fn display_name(&self) -> &str;

  fn description(&self) -> &str;

  fn category(&self) -> &str;

  fn icon(&self) -> Option<&str> {
    None
  }

  fn is_trigger(&self) -> bool {
    false
  }

  /// Whether the handler may block on I/O for longer than a trivial budget.
  fn supports_async(&self) -> bool {
    false
  }

  /// JSON-Schema-like description of the accepted configuration.
  fn config_schema(&self) -> Value {
    empty_object_schema()
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    InterfaceDefinition::default()
  }

  /// Pre-flight check of the resolved configuration.
  fn validate_config(&self, _config: &Map<String, Value>) -> ValidationResult {
    ValidationResult::valid()
  }

  async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeExecutionResult, HandlerError>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_interface_serializes() {
    let value = serde_json::to_value(InterfaceDefinition::default()).unwrap();
    assert_eq!(
      value,
      json!({
        "inputs": [ { "name": "input", "type": "any", "required": false } ],
        "outputs": [ { "name": "output", "type": "any" } ]
      })
    );
  }

  #[test]
  fn test_empty_object_schema() {
    let schema = empty_object_schema();
    assert_eq!(schema["type"], "object");
    assert!(schema["properties"].as_object().unwrap().is_empty());
  }
}
