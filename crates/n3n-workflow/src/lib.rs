//! n3n Workflow
//!
//! Validates flow definitions and derives what an orchestrator needs to run
//! them:
//! - Structural checks (dangling edges, self-loops, duplicate ids, cycles)
//! - Entry and exit points
//! - A deterministic topological execution order
//! - The dependency map, a partial order that exposes parallelism
//! - Edge-type queries for deciding which edges fire after a node completes

mod edges;
mod graph;
mod parser;
mod result;

pub use edges::{edges_by_type, outgoing_edges_by_type, traversable_edges};
pub use graph::FlowGraph;
pub use parser::{DEFAULT_KNOWN_TYPES, DagParser, ParserConfig};
pub use result::ParseResult;

use n3n_config::FlowDefinition;

/// Whether the definition is a valid DAG under the default parser settings.
pub fn is_valid_dag(definition: &FlowDefinition) -> bool {
  DagParser::default().is_valid_dag(definition)
}

/// Execution order under the default parser settings, empty when invalid.
pub fn execution_order(definition: &FlowDefinition) -> Vec<String> {
  DagParser::default().execution_order(definition)
}
