//! n3n Built-in Nodes
//!
//! Handlers that ship with the engine and are registered at boot through
//! [`builtin_registry`].

mod condition;
mod encoding;
mod output;
mod text;

pub use condition::ConditionHandler;
pub use encoding::Base64Handler;
pub use output::OutputHandler;
pub use text::{MAX_PAD_LENGTH, TextHandler};

use n3n_handler::multiop::MultiOperationNode;
use n3n_handler::{CatalogError, HandlerRegistry};

/// Register every built-in handler into `registry`.
pub fn register_builtins(registry: &mut HandlerRegistry) -> Result<(), CatalogError> {
  registry.register(ConditionHandler);
  registry.register(OutputHandler);
  registry.register(Base64Handler);
  registry.register(MultiOperationNode::new(TextHandler)?);
  Ok(())
}

/// A registry holding the built-in handlers.
pub fn builtin_registry() -> Result<HandlerRegistry, CatalogError> {
  let mut registry = HandlerRegistry::new();
  register_builtins(&mut registry)?;
  registry.log_summary();
  Ok(registry)
}
