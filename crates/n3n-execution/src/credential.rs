use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::CredentialError;

/// Fetches decrypted credential payloads by id.
///
/// Credential ids are opaque strings. Storage and encryption live behind this
/// trait.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
  async fn resolve(
    &self,
    credential_id: &str,
    user_id: Option<&str>,
  ) -> Result<Map<String, Value>, CredentialError>;
}

/// In-memory resolver backed by a fixed map, ignoring the user.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
  credentials: HashMap<String, Map<String, Value>>,
}

impl StaticCredentialResolver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_credential(mut self, credential_id: impl Into<String>, data: Map<String, Value>) -> Self {
    self.credentials.insert(credential_id.into(), data);
    self
  }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
  async fn resolve(
    &self,
    credential_id: &str,
    _user_id: Option<&str>,
  ) -> Result<Map<String, Value>, CredentialError> {
    self
      .credentials
      .get(credential_id)
      .cloned()
      .ok_or_else(|| CredentialError::NotFound {
        credential_id: credential_id.to_string(),
      })
  }
}
