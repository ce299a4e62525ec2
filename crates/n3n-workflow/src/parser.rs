use std::collections::{BTreeSet, HashSet};

use n3n_config::FlowDefinition;
use serde_json::Value;
use tracing::debug;

use crate::graph::FlowGraph;
use crate::result::ParseResult;

/// Node types every flow editor understands out of the box.
pub const DEFAULT_KNOWN_TYPES: &[&str] = &[
  "trigger",
  "input",
  "action",
  "default",
  "condition",
  "loop",
  "output",
  "subflow",
  "script",
  "api",
  "wait",
];

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
  /// Lowercased node types that do not produce an "unknown type" warning.
  pub known_types: BTreeSet<String>,
}

impl ParserConfig {
  /// Extend the allow-list, e.g. with the types of every registered handler.
  pub fn with_known_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self
      .known_types
      .extend(types.into_iter().map(|t| t.as_ref().to_lowercase()));
    self
  }

  pub fn is_known(&self, node_type: &str) -> bool {
    self.known_types.contains(&node_type.to_lowercase())
  }
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      known_types: DEFAULT_KNOWN_TYPES.iter().map(|t| t.to_string()).collect(),
    }
  }
}

/// Validates flow definitions and computes their execution order.
///
/// Parsing never fails: every problem is reported through [`ParseResult`]
/// so editors can show all of them at once.
#[derive(Debug, Clone, Default)]
pub struct DagParser {
  config: ParserConfig,
}

impl DagParser {
  pub fn new(config: ParserConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ParserConfig {
    &self.config
  }

  /// Parse a generic `{"nodes": [...], "edges": [...]}` value.
  pub fn parse_value(&self, definition: &Value) -> ParseResult {
    match definition {
      Value::Null => {
        let mut result = ParseResult::new();
        result.add_error("Flow definition is null");
        result
      }
      Value::Object(_) => self.parse(&FlowDefinition::from_value(definition)),
      _ => {
        let mut result = ParseResult::new();
        result.add_error("Flow definition must be an object");
        result
      }
    }
  }

  /// Validate a flow definition.
  pub fn parse(&self, definition: &FlowDefinition) -> ParseResult {
    let mut result = ParseResult::new();

    if definition.nodes.is_empty() {
      result.add_error("Flow has no nodes");
      return result;
    }

    let graph = FlowGraph::build(definition, &mut result);

    result.entry_points = graph.entry_points();
    result.exit_points = graph.exit_points();

    if result.entry_points.is_empty() {
      result.add_error("Flow has no entry points (all nodes have incoming edges, possibly a cycle)");
    }
    if result.exit_points.is_empty() {
      result.add_warning("Flow has no exit points (all nodes have outgoing edges)");
    }

    match graph.topological_order() {
      Some(order) => result.execution_order = order,
      None => {
        result.add_error("Cycle detected in flow - flow must be a DAG (Directed Acyclic Graph)")
      }
    }

    for node_id in graph.node_ids() {
      let upstream: BTreeSet<String> = graph.upstream(node_id).iter().cloned().collect();
      result.dependencies.insert(node_id.clone(), upstream);
    }

    self.validate_node_types(definition, &mut result);

    debug!(
      nodes = definition.nodes.len(),
      edges = definition.edges.len(),
      valid = result.valid,
      errors = result.errors.len(),
      warnings = result.warnings.len(),
      "flow_parsed"
    );

    result
  }

  /// Whether the definition is a valid DAG.
  pub fn is_valid_dag(&self, definition: &FlowDefinition) -> bool {
    self.parse(definition).valid
  }

  /// Execution order of a valid definition, or empty when invalid.
  pub fn execution_order(&self, definition: &FlowDefinition) -> Vec<String> {
    let result = self.parse(definition);
    if result.valid {
      result.execution_order
    } else {
      Vec::new()
    }
  }

  fn validate_node_types(&self, definition: &FlowDefinition, result: &mut ParseResult) {
    let mut seen = HashSet::new();
    for node in &definition.nodes {
      if node.id.is_empty() || !seen.insert(node.id.as_str()) {
        continue;
      }
      match node.node_type.as_deref() {
        None | Some("") => {
          result.add_warning(format!("Node {} has no type specified", node.id));
        }
        Some(node_type) if !self.config.is_known(node_type) => {
          result.add_warning(format!("Node {} has unknown type: {}", node.id, node_type));
        }
        Some(_) => {}
      }
    }
  }
}
