//! n3n Handlers
//!
//! The uniform contract every executable node type implements, plus the
//! machinery around it:
//!
//! - [`NodeHandler`]: identity, config schema, port interface, validation
//!   and execution.
//! - [`execute_node`]: the boundary that resolves expressions, validates and
//!   runs a handler, turning errors and panics into failure results.
//! - [`HandlerRegistry`]: type string to handler lookup, built once at boot.
//! - [`multiop`]: resource/operation/field composition for integrations
//!   with many operations.

mod error;
mod executor;
mod handler;
pub mod multiop;
mod registry;

pub use error::{CatalogError, HandlerError};
pub use executor::execute_node;
pub use handler::{InterfaceDefinition, NodeHandler, PortDef, empty_object_schema};
pub use registry::{HandlerInfo, HandlerRegistry};
