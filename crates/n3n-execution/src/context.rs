use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::credential::CredentialResolver;

/// Everything a handler can see during one node invocation.
///
/// Built by the orchestrator for a single call. `previous_outputs` is a
/// snapshot: outputs of completed upstream nodes keyed by node id.
#[derive(Clone, Default)]
pub struct NodeExecutionContext {
  pub execution_id: String,
  pub node_id: String,
  pub node_type: String,
  /// Raw node configuration, possibly containing `{{ }}` expressions.
  pub node_config: Map<String, Value>,
  pub input_data: Value,
  pub previous_outputs: HashMap<String, Value>,
  pub global_context: Map<String, Value>,
  pub flow_id: Option<String>,
  pub flow_version: Option<String>,
  pub user_id: Option<String>,
  pub credential_resolver: Option<Arc<dyn CredentialResolver>>,
}

impl NodeExecutionContext {
  pub fn new(
    execution_id: impl Into<String>,
    node_id: impl Into<String>,
    node_type: impl Into<String>,
  ) -> Self {
    Self {
      execution_id: execution_id.into(),
      node_id: node_id.into(),
      node_type: node_type.into(),
      ..Default::default()
    }
  }

  pub fn with_config(mut self, config: Map<String, Value>) -> Self {
    self.node_config = config;
    self
  }

  pub fn with_input(mut self, input: Value) -> Self {
    self.input_data = input;
    self
  }

  pub fn with_previous_output(mut self, node_id: impl Into<String>, output: Value) -> Self {
    self.previous_outputs.insert(node_id.into(), output);
    self
  }

  pub fn with_global_context(mut self, global: Map<String, Value>) -> Self {
    self.global_context = global;
    self
  }

  pub fn with_flow(mut self, flow_id: impl Into<String>, version: impl Into<String>) -> Self {
    self.flow_id = Some(flow_id.into());
    self.flow_version = Some(version.into());
    self
  }

  pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
    self.user_id = Some(user_id.into());
    self
  }

  pub fn with_credential_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
    self.credential_resolver = Some(resolver);
    self
  }

  pub fn config_value(&self, key: &str) -> Option<&Value> {
    self.node_config.get(key)
  }

  /// Field of the input payload, if the input is an object.
  pub fn input_value(&self, key: &str) -> Option<&Value> {
    self.input_data.as_object().and_then(|m| m.get(key))
  }

  pub fn previous_output(&self, node_id: &str) -> Option<&Value> {
    self.previous_outputs.get(node_id)
  }

  pub fn global_value(&self, key: &str) -> Option<&Value> {
    self.global_context.get(key)
  }

  /// Fetch a credential payload.
  ///
  /// Never fails: a missing resolver or a resolver error yields an empty map
  /// so the handler decides whether the credential was actually needed.
  pub async fn resolve_credential(&self, credential_id: &str) -> Map<String, Value> {
    let Some(resolver) = &self.credential_resolver else {
      warn!(
        node_id = %self.node_id,
        credential_id = %credential_id,
        "credential requested without a resolver"
      );
      return Map::new();
    };

    match resolver.resolve(credential_id, self.user_id.as_deref()).await {
      Ok(credential) => credential,
      Err(e) => {
        warn!(
          node_id = %self.node_id,
          credential_id = %credential_id,
          error = %e,
          "credential resolution failed"
        );
        Map::new()
      }
    }
  }
}

impl fmt::Debug for NodeExecutionContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NodeExecutionContext")
      .field("execution_id", &self.execution_id)
      .field("node_id", &self.node_id)
      .field("node_type", &self.node_type)
      .field("node_config", &self.node_config)
      .field("input_data", &self.input_data)
      .field("previous_outputs", &self.previous_outputs)
      .field("global_context", &self.global_context)
      .field("flow_id", &self.flow_id)
      .field("flow_version", &self.flow_version)
      .field("user_id", &self.user_id)
      .field("credential_resolver", &self.credential_resolver.is_some())
      .finish()
  }
}
