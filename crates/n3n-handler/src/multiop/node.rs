use async_trait::async_trait;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CatalogError, HandlerError};
use crate::handler::{InterfaceDefinition, NodeHandler};
use crate::multiop::catalog::Catalog;
use crate::multiop::operation::OperationDef;
use crate::multiop::params::{Credential, Params, is_blank, value_to_string};

/// An integration exposing many operations grouped by resource.
///
/// Implementors describe their resources and operations once through
/// [`catalog`](MultiOperationHandler::catalog) and implement
/// [`execute_operation`](MultiOperationHandler::execute_operation).
/// Wrapping the implementor in [`MultiOperationNode`] provides the node
/// handler: resource/operation routing, credential resolution, parameter
/// extraction with defaults and the merged config schema.
#[async_trait]
pub trait MultiOperationHandler: Send + Sync {
  fn node_type(&self) -> &str;

  fn display_name(&self) -> &str;

  fn description(&self) -> &str;

  fn category(&self) -> &str;

  fn icon(&self) -> Option<&str> {
    None
  }

  fn supports_async(&self) -> bool {
    false
  }

  /// Credential type to select in the editor, e.g. `"redis"`. `None` when
  /// the integration needs no credential.
  fn credential_type(&self) -> Option<&str> {
    None
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    InterfaceDefinition::default()
  }

  /// Resources and operations. Called once when the node is constructed.
  fn catalog(&self) -> Result<Catalog, CatalogError>;

  /// Perform one operation.
  ///
  /// `credential` is empty when no `credentialId` was configured or it could
  /// not be resolved. `params` holds the operation's fields with defaults
  /// applied and required fields already checked.
  async fn execute_operation(
    &self,
    ctx: &NodeExecutionContext,
    resource: &str,
    operation: &str,
    credential: &Credential,
    params: &Params,
  ) -> Result<NodeExecutionResult, HandlerError>;
}

/// [`NodeHandler`] adapter for a [`MultiOperationHandler`].
///
/// The catalog and merged schema are built once in [`new`](Self::new).
pub struct MultiOperationNode<H> {
  inner: H,
  catalog: Catalog,
  schema: Value,
}

impl<H: MultiOperationHandler> MultiOperationNode<H> {
  pub fn new(inner: H) -> Result<Self, CatalogError> {
    let catalog = inner.catalog()?;
    if catalog.is_empty() {
      return Err(CatalogError::Empty {
        node_type: inner.node_type().to_string(),
      });
    }
    let schema = catalog.config_schema(inner.credential_type());
    Ok(Self {
      inner,
      catalog,
      schema,
    })
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  pub fn inner(&self) -> &H {
    &self.inner
  }

  async fn resolve_credential(&self, ctx: &NodeExecutionContext) -> Credential {
    match ctx.config_value("credentialId") {
      Some(id) if !is_blank(Some(id)) => {
        Credential::new(ctx.resolve_credential(&value_to_string(id)).await)
      }
      _ => Credential::default(),
    }
  }
}

/// Values for each declared field of `operation`, with defaults substituted
/// for absent, `null` or empty-string values.
fn extract_params(config: &Map<String, Value>, operation: &OperationDef) -> Params {
  let mut params = Map::new();
  for field in &operation.fields {
    let configured = config.get(&field.name);
    let value = match (&field.default, is_blank(configured)) {
      (Some(default), true) => Some(default.clone()),
      _ => configured.cloned(),
    };
    if let Some(value) = value {
      params.insert(field.name.clone(), value);
    }
  }
  Params::new(params)
}

fn config_str(config: &Map<String, Value>, key: &str) -> String {
  match config.get(key) {
    None | Some(Value::Null) => String::new(),
    Some(value) => value_to_string(value),
  }
}

#[async_trait]
impl<H: MultiOperationHandler> NodeHandler for MultiOperationNode<H> {
  fn node_type(&self) -> &str {
    self.inner.node_type()
  }

  fn display_name(&self) -> &str {
    self.inner.display_name()
  }

  fn description(&self) -> &str {
    self.inner.description()
  }

  fn category(&self) -> &str {
    self.inner.category()
  }

  fn icon(&self) -> Option<&str> {
    self.inner.icon()
  }

  fn supports_async(&self) -> bool {
    self.inner.supports_async()
  }

  fn config_schema(&self) -> Value {
    self.schema.clone()
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    self.inner.interface_definition()
  }

  async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeExecutionResult, HandlerError> {
    let resource = config_str(&ctx.node_config, "resource");
    let operation = config_str(&ctx.node_config, "operation");

    if resource.is_empty() {
      return Ok(NodeExecutionResult::failure("Resource not selected"));
    }
    if operation.is_empty() {
      return Ok(NodeExecutionResult::failure("Operation not selected"));
    }
    if self.catalog.resource(&resource).is_none() {
      return Ok(NodeExecutionResult::failure(format!(
        "Unknown resource: {}",
        resource
      )));
    }
    let Some(op) = self.catalog.operation(&resource, &operation) else {
      return Ok(NodeExecutionResult::failure(format!(
        "Unknown operation: {} for resource: {}",
        operation, resource
      )));
    };

    let params = extract_params(&ctx.node_config, op);
    if let Some(missing) = op.fields.iter().find(|f| f.required && params.is_missing(&f.name)) {
      return Ok(NodeExecutionResult::failure(
        HandlerError::MissingParameter {
          name: missing.name.clone(),
        }
        .to_string(),
      ));
    }

    let credential = self.resolve_credential(ctx).await;

    debug!(
      node_type = %self.inner.node_type(),
      resource = %resource,
      operation = %operation,
      params = params.len(),
      has_credential = !credential.is_empty(),
      "executing operation"
    );

    self
      .inner
      .execute_operation(ctx, &resource, &operation, &credential, &params)
      .await
  }
}
