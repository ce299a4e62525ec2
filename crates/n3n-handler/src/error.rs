use thiserror::Error;

/// Errors raised by a handler while executing.
///
/// These never reach the orchestrator: the execution boundary converts them
/// into failed [`NodeExecutionResult`](n3n_execution::NodeExecutionResult)s
/// using the display text as the error message.
#[derive(Debug, Error)]
pub enum HandlerError {
  #[error("Required parameter '{name}' is missing")]
  MissingParameter { name: String },

  #[error("Invalid parameter '{name}': {message}")]
  InvalidParameter { name: String, message: String },

  #[error("Credential field '{field}' is required")]
  MissingCredential { field: String },

  #[error("{message}")]
  Failed { message: String },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl HandlerError {
  pub fn failed(message: impl Into<String>) -> Self {
    HandlerError::Failed {
      message: message.into(),
    }
  }

  pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
    HandlerError::InvalidParameter {
      name: name.into(),
      message: message.into(),
    }
  }
}

/// Problems in a multi-operation handler's static catalog.
///
/// Raised once at construction, so a misdeclared handler fails at boot
/// rather than on a user's request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("handler '{node_type}' declares no resources")]
  Empty { node_type: String },

  #[error("duplicate resource: {resource}")]
  DuplicateResource { resource: String },

  #[error("duplicate operation '{operation}' for resource '{resource}'")]
  DuplicateOperation { resource: String, operation: String },

  #[error("resource '{resource}' declares no operations")]
  NoOperations { resource: String },
}
