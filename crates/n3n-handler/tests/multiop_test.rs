use std::sync::Arc;

use async_trait::async_trait;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult, StaticCredentialResolver};
use n3n_handler::multiop::{
  Catalog, Credential, FieldDef, MultiOperationHandler, MultiOperationNode, OperationDef, Params,
  ResourceDef,
};
use n3n_handler::{CatalogError, HandlerError, HandlerRegistry, NodeHandler};
use serde_json::{Map, Value, json};

/// Key-value store integration that reports what it was asked to do.
struct KvStore;

#[async_trait]
impl MultiOperationHandler for KvStore {
  fn node_type(&self) -> &str {
    "kv"
  }

  fn display_name(&self) -> &str {
    "Key-Value Store"
  }

  fn description(&self) -> &str {
    "Reads and writes keys"
  }

  fn category(&self) -> &str {
    "database"
  }

  fn icon(&self) -> Option<&str> {
    Some("database")
  }

  fn credential_type(&self) -> Option<&str> {
    Some("kv")
  }

  fn catalog(&self) -> Result<Catalog, CatalogError> {
    Catalog::builder()
      .resource(
        ResourceDef::new("string", "String"),
        [
          OperationDef::new("get", "Get").with_field(FieldDef::string("key", "Key").required()),
          OperationDef::new("set", "Set").with_fields([
            FieldDef::string("key", "Key").required(),
            FieldDef::string("value", "Value"),
            FieldDef::integer("ttl", "TTL").with_default(1000),
          ]),
        ],
      )
      .resource(
        ResourceDef::new("server", "Server"),
        [OperationDef::new("ping", "Ping").without_credential()],
      )
      .build()
  }

  async fn execute_operation(
    &self,
    _ctx: &NodeExecutionContext,
    resource: &str,
    operation: &str,
    credential: &Credential,
    params: &Params,
  ) -> Result<NodeExecutionResult, HandlerError> {
    if resource == "server" {
      return Ok(NodeExecutionResult::success(json!({ "pong": true })));
    }
    let host = credential.required("host")?;
    Ok(NodeExecutionResult::success(json!({
      "host": host,
      "operation": format!("{}.{}", resource, operation),
      "key": params.required_str("key")?,
      "ttl": params.i64_or("ttl", 0),
    })))
  }
}

/// Declares nothing.
struct Hollow;

#[async_trait]
impl MultiOperationHandler for Hollow {
  fn node_type(&self) -> &str {
    "hollow"
  }

  fn display_name(&self) -> &str {
    "Hollow"
  }

  fn description(&self) -> &str {
    "No operations"
  }

  fn category(&self) -> &str {
    "testing"
  }

  fn catalog(&self) -> Result<Catalog, CatalogError> {
    Ok(Catalog::default())
  }

  async fn execute_operation(
    &self,
    _ctx: &NodeExecutionContext,
    _resource: &str,
    _operation: &str,
    _credential: &Credential,
    _params: &Params,
  ) -> Result<NodeExecutionResult, HandlerError> {
    Ok(NodeExecutionResult::success(Value::Null))
  }
}

fn config(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => panic!("expected an object"),
  }
}

fn context(cfg: Value) -> NodeExecutionContext {
  let resolver = StaticCredentialResolver::new().with_credential("cred-1", config(json!({ "host": "localhost" })));
  NodeExecutionContext::new("exec-1", "n1", "kv")
    .with_config(config(cfg))
    .with_credential_resolver(Arc::new(resolver))
}

#[tokio::test]
async fn test_dispatches_with_defaults_and_credential() {
  let node = MultiOperationNode::new(KvStore).unwrap();
  let ctx = context(json!({
    "credentialId": "cred-1",
    "resource": "string",
    "operation": "set",
    "key": "greeting",
  }));

  let result = node.execute(&ctx).await.unwrap();

  assert!(result.success);
  assert_eq!(
    result.output,
    json!({ "host": "localhost", "operation": "string.set", "key": "greeting", "ttl": 1000 })
  );
}

#[tokio::test]
async fn test_routing_failures() {
  let node = MultiOperationNode::new(KvStore).unwrap();

  let cases = [
    (json!({ "operation": "get" }), "Resource not selected"),
    (json!({ "resource": "string" }), "Operation not selected"),
    (
      json!({ "resource": "list", "operation": "push" }),
      "Unknown resource: list",
    ),
    (
      json!({ "resource": "string", "operation": "delete" }),
      "Unknown operation: delete for resource: string",
    ),
    (
      json!({ "resource": "string", "operation": "get", "key": "" }),
      "Required parameter 'key' is missing",
    ),
  ];

  for (cfg, expected) in cases {
    let result = node.execute(&context(cfg)).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some(expected));
  }
}

#[tokio::test]
async fn test_unresolvable_credential_degrades_to_empty() {
  let node = MultiOperationNode::new(KvStore).unwrap();
  let ctx = context(json!({
    "credentialId": "cred-unknown",
    "resource": "string",
    "operation": "get",
    "key": "k",
  }));

  let err = node.execute(&ctx).await.unwrap_err();
  assert_eq!(err.to_string(), "Credential field 'host' is required");
}

#[tokio::test]
async fn test_operation_without_credential() {
  let node = MultiOperationNode::new(KvStore).unwrap();
  let result = node
    .execute(&context(json!({ "resource": "server", "operation": "ping" })))
    .await
    .unwrap();
  assert_eq!(result.output, json!({ "pong": true }));
}

#[test]
fn test_node_metadata_and_schema() {
  let node = MultiOperationNode::new(KvStore).unwrap();

  assert_eq!(node.node_type(), "kv");
  assert_eq!(node.icon(), Some("database"));
  assert_eq!(node.catalog().operations("string").len(), 2);

  let schema = node.config_schema();
  assert_eq!(schema["x-credential-type"], json!("kv"));
  assert_eq!(schema["properties"]["operation"]["enum"], json!(["get", "set", "ping"]));
  assert_eq!(schema["properties"]["ttl"]["default"], json!(1000));

  let defs = schema["x-operation-definitions"].as_array().unwrap();
  assert_eq!(defs[2]["requiresCredential"], json!(false));
}

#[test]
fn test_empty_catalog_rejected() {
  let err = MultiOperationNode::new(Hollow).err().unwrap();
  assert_eq!(
    err,
    CatalogError::Empty {
      node_type: "hollow".to_string()
    }
  );
}

#[tokio::test]
async fn test_registry_resolves_expressions_before_dispatch() {
  let mut registry = HandlerRegistry::new();
  registry.register(MultiOperationNode::new(KvStore).unwrap());

  let ctx = context(json!({
    "credentialId": "cred-1",
    "resource": "string",
    "operation": "get",
    "key": "{{ $json.user.id }}",
  }))
  .with_input(json!({ "user": { "id": "user:42" } }));

  let result = registry.execute(ctx).await;

  assert!(result.success, "{:?}", result.error_message);
  assert_eq!(result.output["key"], json!("user:42"));
  assert_eq!(result.output["operation"], json!("string.get"));
}
