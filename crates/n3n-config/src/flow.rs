use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::edge::FlowEdge;
use crate::error::ConfigError;
use crate::node::FlowNode;

/// Nodes and edges of one flow version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDefinition {
  #[serde(default)]
  pub nodes: Vec<FlowNode>,
  #[serde(default)]
  pub edges: Vec<FlowEdge>,
}

impl FlowDefinition {
  pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
    Self { nodes, edges }
  }

  /// Read a definition out of a generic `{"nodes": [...], "edges": [...]}` map.
  ///
  /// Extraction never fails. Entries that are not objects are skipped, fields
  /// with the wrong shape are treated as absent and unknown keys are ignored.
  /// Structural problems (empty ids, dangling edges) are left for the
  /// validator to report.
  pub fn from_value(value: &Value) -> Self {
    let nodes = array_of_objects(value, "nodes").map(read_node).collect();
    let edges = array_of_objects(value, "edges").map(read_edge).collect();
    Self { nodes, edges }
  }

  /// Parse a definition from JSON text.
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    let value: Value = serde_json::from_str(content)?;
    if !value.is_object() {
      return Err(ConfigError::NotAnObject);
    }
    Ok(Self::from_value(&value))
  }

  pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  /// Edges leaving the given node, in declaration order.
  pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> {
    self.edges.iter().filter(move |e| e.source == node_id)
  }
}

fn array_of_objects<'a>(
  value: &'a Value,
  key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
  value
    .get(key)
    .and_then(Value::as_array)
    .into_iter()
    .flatten()
    .filter_map(Value::as_object)
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
  map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn object_field(map: &Map<String, Value>, key: &str) -> Map<String, Value> {
  match map.get(key) {
    Some(Value::Object(obj)) => obj.clone(),
    _ => Map::new(),
  }
}

fn read_node(map: &Map<String, Value>) -> FlowNode {
  FlowNode {
    id: string_field(map, "id").unwrap_or_default(),
    node_type: string_field(map, "type"),
    position: object_field(map, "position"),
    data: object_field(map, "data"),
  }
}

fn read_edge(map: &Map<String, Value>) -> FlowEdge {
  FlowEdge {
    id: string_field(map, "id"),
    source: string_field(map, "source").unwrap_or_default(),
    target: string_field(map, "target").unwrap_or_default(),
    source_handle: string_field(map, "sourceHandle"),
    target_handle: string_field(map, "targetHandle"),
    edge_type: string_field(map, "edgeType"),
    label: string_field(map, "label"),
  }
}
