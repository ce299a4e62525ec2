//! n3n Config
//!
//! Serializable flow definition types. A flow is a list of nodes and a list
//! of typed edges, stored and exchanged as plain JSON maps:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "a", "type": "trigger", "data": { "config": {} } }],
//!   "edges": [{ "id": "e1", "source": "a", "target": "b", "edgeType": "error" }]
//! }
//! ```
//!
//! These types carry no validation of their own. The graph validator in
//! `n3n-workflow` checks them and derives an execution order.

mod edge;
mod error;
mod flow;
mod node;

pub use edge::{EdgeType, FlowEdge};
pub use error::ConfigError;
pub use flow::FlowDefinition;
pub use node::FlowNode;
