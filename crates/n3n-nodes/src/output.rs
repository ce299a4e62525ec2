use async_trait::async_trait;
use chrono::Utc;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use n3n_handler::multiop::Params;
use n3n_handler::{HandlerError, InterfaceDefinition, NodeHandler, PortDef};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Terminal node producing the flow's final data.
///
/// `outputMode` picks what is emitted: `all` passes the input through,
/// `selected` keeps only `selectedFields`, `expression` emits the resolved
/// `outputExpression` (objects as-is, anything else under `result`).
pub struct OutputHandler;

fn input_map(input: &Value) -> Map<String, Value> {
  input.as_object().cloned().unwrap_or_default()
}

fn select_fields(input: &Value, params: &Params) -> Map<String, Value> {
  let source = input_map(input);
  params
    .list("selectedFields")
    .iter()
    .filter_map(Value::as_str)
    .filter_map(|name| source.get(name).map(|v| (name.to_string(), v.clone())))
    .collect()
}

fn expression_output(input: &Value, params: &Params) -> Map<String, Value> {
  match params.get("outputExpression") {
    None | Some(Value::Null) => input_map(input),
    Some(Value::String(s)) if s.is_empty() => input_map(input),
    Some(Value::Object(map)) => map.clone(),
    Some(other) => {
      let mut map = Map::new();
      map.insert("result".into(), other.clone());
      map
    }
  }
}

#[async_trait]
impl NodeHandler for OutputHandler {
  fn node_type(&self) -> &str {
    "output"
  }

  fn display_name(&self) -> &str {
    "Output"
  }

  fn description(&self) -> &str {
    "Marks the end of a workflow branch and outputs the final data."
  }

  fn category(&self) -> &str {
    "Flow Control"
  }

  fn icon(&self) -> Option<&str> {
    Some("flag")
  }

  fn config_schema(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "outputMode": {
          "type": "string",
          "title": "Output Mode",
          "enum": ["all", "selected", "expression"],
          "default": "all",
          "description": "How to determine the output data"
        },
        "selectedFields": {
          "type": "array",
          "title": "Selected Fields",
          "items": { "type": "string" },
          "description": "Fields to include in output (for 'selected' mode)"
        },
        "outputExpression": {
          "type": "string",
          "title": "Output Expression",
          "description": "Expression to evaluate for output (for 'expression' mode)"
        },
        "includeMetadata": {
          "type": "boolean",
          "title": "Include Metadata",
          "default": false,
          "description": "Add execution metadata to output"
        }
      }
    })
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    InterfaceDefinition {
      inputs: vec![PortDef::input("input", "any", true)],
      outputs: Vec::new(),
    }
  }

  async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeExecutionResult, HandlerError> {
    let params = Params::new(ctx.node_config.clone());

    let mut output = match params.str_or("outputMode", "all").as_str() {
      "selected" => select_fields(&ctx.input_data, &params),
      "expression" => expression_output(&ctx.input_data, &params),
      _ => input_map(&ctx.input_data),
    };

    if params.bool_or("includeMetadata", false) {
      output.insert(
        "_metadata".into(),
        json!({
          "executionId": ctx.execution_id,
          "nodeId": ctx.node_id,
          "timestamp": Utc::now().timestamp_millis(),
        }),
      );
    }

    debug!(node_id = %ctx.node_id, fields = output.len(), "output produced");
    Ok(NodeExecutionResult::success(Value::Object(output)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx(config: Value) -> NodeExecutionContext {
    NodeExecutionContext::new("exec-9", "out", "output")
      .with_config(config.as_object().cloned().unwrap_or_default())
      .with_input(json!({ "id": 7, "name": "ada", "secret": "x" }))
  }

  #[tokio::test]
  async fn test_all_passes_input_through() {
    let result = OutputHandler.execute(&ctx(json!({}))).await.unwrap();
    assert_eq!(result.output, json!({ "id": 7, "name": "ada", "secret": "x" }));
  }

  #[tokio::test]
  async fn test_selected_fields() {
    let cfg = json!({ "outputMode": "selected", "selectedFields": ["name", "missing", "id"] });
    let result = OutputHandler.execute(&ctx(cfg)).await.unwrap();
    assert_eq!(result.output, json!({ "name": "ada", "id": 7 }));
  }

  #[tokio::test]
  async fn test_expression_output() {
    let wrapped = OutputHandler
      .execute(&ctx(json!({ "outputMode": "expression", "outputExpression": 42 })))
      .await
      .unwrap();
    assert_eq!(wrapped.output, json!({ "result": 42 }));

    let object = OutputHandler
      .execute(&ctx(json!({ "outputMode": "expression", "outputExpression": { "k": 1 } })))
      .await
      .unwrap();
    assert_eq!(object.output, json!({ "k": 1 }));

    let empty = OutputHandler
      .execute(&ctx(json!({ "outputMode": "expression", "outputExpression": "" })))
      .await
      .unwrap();
    assert_eq!(empty.output["id"], json!(7));
  }

  #[tokio::test]
  async fn test_metadata() {
    let result = OutputHandler
      .execute(&ctx(json!({ "includeMetadata": true })))
      .await
      .unwrap();
    assert_eq!(result.output["_metadata"]["executionId"], json!("exec-9"));
    assert_eq!(result.output["_metadata"]["nodeId"], json!("out"));
    assert!(result.output["_metadata"]["timestamp"].is_i64());
  }
}
