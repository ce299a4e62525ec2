use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid flow definition JSON: {0}")]
  InvalidJson(#[from] serde_json::Error),

  #[error("flow definition must be a JSON object")]
  NotAnObject,
}
