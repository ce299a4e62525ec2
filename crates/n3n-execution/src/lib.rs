//! Execution types for n3n.
//!
//! These are the values exchanged between an orchestrator and node handlers:
//! the per-invocation [`NodeExecutionContext`], the structured
//! [`NodeExecutionResult`], config [`ValidationResult`]s and the
//! [`CredentialResolver`] seam used to fetch credential payloads.

mod context;
mod credential;
mod error;
mod result;
mod validation;

pub use context::NodeExecutionContext;
pub use credential::{CredentialResolver, StaticCredentialResolver};
pub use error::CredentialError;
pub use result::NodeExecutionResult;
pub use validation::{ValidationError, ValidationResult};
