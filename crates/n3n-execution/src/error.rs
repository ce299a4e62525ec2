use thiserror::Error;

/// Errors a credential resolver may report.
#[derive(Debug, Error)]
pub enum CredentialError {
  #[error("credential not found: {credential_id}")]
  NotFound { credential_id: String },

  #[error("access to credential '{credential_id}' denied")]
  AccessDenied { credential_id: String },

  #[error("credential backend error: {message}")]
  Backend { message: String },
}
