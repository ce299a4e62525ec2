use std::collections::HashSet;

use serde_json::{Map, Value, json};

use crate::error::CatalogError;
use crate::multiop::field::FieldDef;
use crate::multiop::operation::{OperationDef, ResourceDef};

#[derive(Debug, Clone)]
struct ResourceEntry {
  resource: ResourceDef,
  operations: Vec<OperationDef>,
}

/// The static resource and operation model of a multi-operation handler.
///
/// Resources and their operations keep declaration order. A
/// `(resource, operation)` pair resolves to exactly one [`OperationDef`];
/// the same operation name may appear under several resources.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  entries: Vec<ResourceEntry>,
}

/// Collects resources for a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
  entries: Vec<ResourceEntry>,
}

impl CatalogBuilder {
  pub fn resource(
    mut self,
    resource: ResourceDef,
    operations: impl IntoIterator<Item = OperationDef>,
  ) -> Self {
    self.entries.push(ResourceEntry {
      resource,
      operations: operations.into_iter().collect(),
    });
    self
  }

  /// Check uniqueness of resources and of operations within each resource.
  pub fn build(self) -> Result<Catalog, CatalogError> {
    let mut resources = HashSet::new();
    for entry in &self.entries {
      if !resources.insert(entry.resource.name.as_str()) {
        return Err(CatalogError::DuplicateResource {
          resource: entry.resource.name.clone(),
        });
      }
      if entry.operations.is_empty() {
        return Err(CatalogError::NoOperations {
          resource: entry.resource.name.clone(),
        });
      }

      let mut operations = HashSet::new();
      for op in &entry.operations {
        if !operations.insert(op.name.as_str()) {
          return Err(CatalogError::DuplicateOperation {
            resource: entry.resource.name.clone(),
            operation: op.name.clone(),
          });
        }
      }
    }

    Ok(Catalog {
      entries: self.entries,
    })
  }
}

impl Catalog {
  pub fn builder() -> CatalogBuilder {
    CatalogBuilder::default()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn resources(&self) -> impl Iterator<Item = &ResourceDef> {
    self.entries.iter().map(|e| &e.resource)
  }

  pub fn resource(&self, name: &str) -> Option<&ResourceDef> {
    self.entry(name).map(|e| &e.resource)
  }

  /// Operations of one resource, empty for an unknown resource.
  pub fn operations(&self, resource: &str) -> &[OperationDef] {
    self
      .entry(resource)
      .map(|e| e.operations.as_slice())
      .unwrap_or(&[])
  }

  pub fn operation(&self, resource: &str, operation: &str) -> Option<&OperationDef> {
    self
      .operations(resource)
      .iter()
      .find(|op| op.name == operation)
  }

  fn entry(&self, name: &str) -> Option<&ResourceEntry> {
    self.entries.iter().find(|e| e.resource.name == name)
  }

  fn all_operations(&self) -> impl Iterator<Item = (&str, &OperationDef)> {
    self.entries.iter().flat_map(|e| {
      e.operations
        .iter()
        .map(move |op| (e.resource.name.as_str(), op))
    })
  }

  /// Merged config schema for the whole handler.
  ///
  /// Properties are the credential selector (when a credential type is set),
  /// the resource and operation selectors and the union of every operation's
  /// fields. Operation names and field names are deduplicated, first
  /// declaration wins. `x-operation-definitions` and `x-resources` let an
  /// editor show only the fields of the chosen operation.
  pub fn config_schema(&self, credential_type: Option<&str>) -> Value {
    let mut properties = Map::new();

    if let Some(credential_type) = credential_type {
      properties.insert(
        "credentialId".into(),
        json!({
          "type": "string",
          "title": "Credential",
          "format": "credential",
          "x-credential-type": credential_type,
        }),
      );
    }

    let resource_names: Vec<&str> = self.resources().map(|r| r.name.as_str()).collect();
    let resource_labels: Vec<&str> = self.resources().map(|r| r.display_name.as_str()).collect();
    properties.insert(
      "resource".into(),
      json!({
        "type": "string",
        "title": "Resource",
        "enum": resource_names,
        "enumNames": resource_labels,
        "default": resource_names.first().copied().unwrap_or_default(),
      }),
    );

    let mut seen_ops = HashSet::new();
    let (op_names, op_labels): (Vec<&str>, Vec<&str>) = self
      .all_operations()
      .filter(|(_, op)| seen_ops.insert(op.name.as_str()))
      .map(|(_, op)| (op.name.as_str(), op.display_name.as_str()))
      .unzip();
    properties.insert(
      "operation".into(),
      json!({
        "type": "string",
        "title": "Operation",
        "enum": op_names,
        "enumNames": op_labels,
      }),
    );

    for field in self.unique_fields() {
      properties.insert(field.name.clone(), field.to_json_schema());
    }

    let operation_definitions: Vec<Value> = self
      .all_operations()
      .map(|(resource, op)| op.to_definition(resource))
      .collect();
    let resource_definitions: Vec<Value> =
      self.resources().map(ResourceDef::to_definition).collect();

    let mut schema = Map::new();
    schema.insert("type".into(), "object".into());
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("x-operation-definitions".into(), operation_definitions.into());
    schema.insert("x-resources".into(), resource_definitions.into());
    schema.insert("x-multi-operation".into(), true.into());
    if let Some(credential_type) = credential_type {
      schema.insert("x-credential-type".into(), credential_type.into());
    }
    Value::Object(schema)
  }

  fn unique_fields(&self) -> Vec<&FieldDef> {
    let mut seen = HashSet::new();
    self
      .all_operations()
      .flat_map(|(_, op)| op.fields.iter())
      .filter(|field| seen.insert(field.name.as_str()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kv_catalog() -> Catalog {
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
        ResourceDef::new("hash", "Hash").with_description("Hash maps"),
        [OperationDef::new("get", "Get Field").with_fields([
          FieldDef::string("key", "Key").required(),
          FieldDef::string("field", "Field").required(),
        ])],
      )
      .build()
      .unwrap()
  }

  #[test]
  fn test_lookup() {
    let catalog = kv_catalog();
    assert!(catalog.resource("hash").is_some());
    assert_eq!(catalog.operations("string").len(), 2);
    assert_eq!(
      catalog.operation("hash", "get").map(|op| op.display_name.as_str()),
      Some("Get Field")
    );
    assert!(catalog.operation("hash", "set").is_none());
    assert!(catalog.operations("list").is_empty());
  }

  #[test]
  fn test_duplicate_resource_rejected() {
    let err = Catalog::builder()
      .resource(ResourceDef::new("a", "A"), [OperationDef::new("x", "X")])
      .resource(ResourceDef::new("a", "A again"), [OperationDef::new("y", "Y")])
      .build()
      .unwrap_err();
    assert_eq!(
      err,
      CatalogError::DuplicateResource {
        resource: "a".to_string()
      }
    );
  }

  #[test]
  fn test_duplicate_operation_rejected() {
    let err = Catalog::builder()
      .resource(
        ResourceDef::new("a", "A"),
        [OperationDef::new("x", "X"), OperationDef::new("x", "X2")],
      )
      .build()
      .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateOperation { .. }));
  }

  #[test]
  fn test_resource_without_operations_rejected() {
    let err = Catalog::builder()
      .resource(ResourceDef::new("a", "A"), Vec::<OperationDef>::new())
      .build()
      .unwrap_err();
    assert!(matches!(err, CatalogError::NoOperations { .. }));
  }

  #[test]
  fn test_schema_deduplicates_operations_and_fields() {
    let schema = kv_catalog().config_schema(None);
    let properties = schema["properties"].as_object().unwrap();

    assert_eq!(properties["resource"]["enum"], json!(["string", "hash"]));
    assert_eq!(properties["resource"]["default"], json!("string"));
    assert_eq!(properties["operation"]["enum"], json!(["get", "set"]));
    assert_eq!(properties["operation"]["enumNames"], json!(["Get", "Set"]));

    let keys: Vec<_> = properties.keys().cloned().collect();
    assert_eq!(
      keys,
      vec!["resource", "operation", "key", "value", "ttl", "field"]
    );
    assert!(properties.get("credentialId").is_none());
    assert!(schema.get("x-credential-type").is_none());
  }

  #[test]
  fn test_schema_metadata() {
    let schema = kv_catalog().config_schema(Some("redis"));

    assert_eq!(schema["x-multi-operation"], json!(true));
    assert_eq!(schema["x-credential-type"], json!("redis"));
    assert_eq!(
      schema["properties"]["credentialId"]["x-credential-type"],
      json!("redis")
    );

    let ops = schema["x-operation-definitions"].as_array().unwrap();
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[2]["resource"], json!("hash"));
    assert_eq!(ops[2]["name"], json!("get"));

    let resources = schema["x-resources"].as_array().unwrap();
    assert_eq!(resources[1]["description"], json!("Hash maps"));
  }

  #[test]
  fn test_empty_catalog_schema() {
    let schema = Catalog::default().config_schema(None);
    assert_eq!(schema["properties"]["resource"]["default"], json!(""));
    assert_eq!(schema["properties"]["operation"]["enum"], json!([]));
  }
}
