use std::cmp::Ordering;

use async_trait::async_trait;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult, ValidationResult};
use n3n_expression::resolve_path;
use n3n_handler::multiop::Params;
use n3n_handler::{HandlerError, InterfaceDefinition, NodeHandler, PortDef};
use serde_json::{Map, Value, json};
use tracing::debug;

const OPERATORS: &[&str] = &[
  "equals",
  "notEquals",
  "contains",
  "notContains",
  "startsWith",
  "endsWith",
  "greaterThan",
  "lessThan",
  "greaterOrEqual",
  "lessOrEqual",
  "isEmpty",
  "isNotEmpty",
  "isTrue",
  "isFalse",
];

/// Routes its input to the `true` or `false` branch.
///
/// `field` is a path into the input data (empty means the whole input),
/// compared against `value` with `operator`. The input passes through
/// unchanged as output.
pub struct ConditionHandler;

fn text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Numeric when both sides parse as numbers, otherwise lexicographic.
fn compare(left: &Value, right: Option<&Value>) -> Ordering {
  let left = text(left);
  let right = right.map(text);
  let left_num = left.trim().parse::<f64>();
  let right_num = match &right {
    Some(r) => r.trim().parse::<f64>(),
    None => Ok(0.0),
  };
  match (left_num, right_num) {
    (Ok(l), Ok(r)) => l.total_cmp(&r),
    _ => left.as_str().cmp(right.as_deref().unwrap_or("")),
  }
}

pub(crate) fn evaluate(left: Option<&Value>, operator: &str, right: Option<&Value>) -> bool {
  let left = left.filter(|v| !v.is_null());
  let right = right.filter(|v| !v.is_null());

  let Some(left) = left else {
    return match right {
      None => matches!(operator, "equals" | "isEmpty"),
      Some(_) => matches!(operator, "notEquals" | "isEmpty"),
    };
  };

  let left_text = text(left);
  let right_text = right.map(text);
  match operator {
    "equals" => Some(&left_text) == right_text.as_ref(),
    "notEquals" => Some(&left_text) != right_text.as_ref(),
    "contains" => right_text.is_some_and(|r| left_text.contains(&r)),
    "notContains" => right_text.is_none_or(|r| !left_text.contains(&r)),
    "startsWith" => right_text.is_some_and(|r| left_text.starts_with(&r)),
    "endsWith" => right_text.is_some_and(|r| left_text.ends_with(&r)),
    "greaterThan" => compare(left, right).is_gt(),
    "lessThan" => compare(left, right).is_lt(),
    "greaterOrEqual" => compare(left, right).is_ge(),
    "lessOrEqual" => compare(left, right).is_le(),
    "isEmpty" => left_text.is_empty(),
    "isNotEmpty" => !left_text.is_empty(),
    "isTrue" => left_text.eq_ignore_ascii_case("true"),
    "isFalse" => !left_text.eq_ignore_ascii_case("true"),
    _ => false,
  }
}

#[async_trait]
impl NodeHandler for ConditionHandler {
  fn node_type(&self) -> &str {
    "condition"
  }

  fn display_name(&self) -> &str {
    "Condition"
  }

  fn description(&self) -> &str {
    "Evaluates conditions and routes data to true or false branches."
  }

  fn category(&self) -> &str {
    "Flow Control"
  }

  fn icon(&self) -> Option<&str> {
    Some("git-branch")
  }

  fn config_schema(&self) -> Value {
    json!({
      "type": "object",
      "required": ["field", "operator"],
      "properties": {
        "field": {
          "type": "string",
          "title": "Field",
          "description": "Field path to evaluate (e.g., data.status)"
        },
        "operator": {
          "type": "string",
          "title": "Operator",
          "enum": OPERATORS,
          "default": "equals"
        },
        "value": {
          "type": "string",
          "title": "Value",
          "description": "Value to compare against"
        }
      }
    })
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    InterfaceDefinition {
      inputs: vec![PortDef::input("input", "any", true)],
      outputs: vec![PortDef::output("true", "any"), PortDef::output("false", "any")],
    }
  }

  fn validate_config(&self, config: &Map<String, Value>) -> ValidationResult {
    match config.get("operator").and_then(Value::as_str) {
      Some(op) if !OPERATORS.contains(&op) => {
        ValidationResult::invalid("operator", format!("Unknown operator: {}", op))
      }
      _ => ValidationResult::valid(),
    }
  }

  async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeExecutionResult, HandlerError> {
    let params = Params::new(ctx.node_config.clone());
    let field = params.str_or("field", "");
    let operator = params.str_or("operator", "equals");

    let left = resolve_path(&ctx.input_data, &field);
    let passed = evaluate(left, &operator, params.get("value"));
    let branch = if passed { "true" } else { "false" };

    debug!(
      node_id = %ctx.node_id,
      field = %field,
      operator = %operator,
      branch,
      "condition evaluated"
    );

    Ok(NodeExecutionResult::success(ctx.input_data.clone()).with_branches([branch]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_string_operators() {
    let status = json!("active");
    assert!(evaluate(Some(&status), "equals", Some(&json!("active"))));
    assert!(evaluate(Some(&status), "notEquals", Some(&json!("done"))));
    assert!(evaluate(Some(&status), "contains", Some(&json!("tiv"))));
    assert!(evaluate(Some(&status), "notContains", None));
    assert!(evaluate(Some(&status), "startsWith", Some(&json!("act"))));
    assert!(!evaluate(Some(&status), "endsWith", Some(&json!("act"))));
  }

  #[test]
  fn test_numbers_compare_numerically() {
    assert!(evaluate(Some(&json!(10)), "greaterThan", Some(&json!("9"))));
    assert!(evaluate(Some(&json!("2.5")), "lessOrEqual", Some(&json!(2.5))));
    assert!(evaluate(Some(&json!(1)), "equals", Some(&json!("1"))));
    assert!(evaluate(Some(&json!(3)), "greaterOrEqual", None));
  }

  #[test]
  fn test_non_numeric_compare_lexicographically() {
    assert!(evaluate(Some(&json!("b")), "greaterThan", Some(&json!("a"))));
    assert!(evaluate(Some(&json!("apple")), "lessThan", Some(&json!("banana"))));
  }

  #[test]
  fn test_missing_left_side() {
    assert!(evaluate(None, "equals", None));
    assert!(evaluate(None, "isEmpty", Some(&json!("x"))));
    assert!(evaluate(Some(&Value::Null), "notEquals", Some(&json!("x"))));
    assert!(!evaluate(None, "contains", Some(&json!("x"))));
  }

  #[test]
  fn test_emptiness_and_booleans() {
    assert!(evaluate(Some(&json!("")), "isEmpty", None));
    assert!(evaluate(Some(&json!("x")), "isNotEmpty", None));
    assert!(evaluate(Some(&json!(true)), "isTrue", None));
    assert!(evaluate(Some(&json!("TRUE")), "isTrue", None));
    assert!(evaluate(Some(&json!("no")), "isFalse", None));
    assert!(!evaluate(Some(&json!("x")), "between", None));
  }

  #[test]
  fn test_validate_rejects_unknown_operator() {
    let mut config = Map::new();
    config.insert("operator".into(), json!("between"));
    let result = ConditionHandler.validate_config(&config);
    assert_eq!(result.summary(), "Unknown operator: between");

    config.insert("operator".into(), json!("equals"));
    assert!(ConditionHandler.validate_config(&config).is_valid());
  }
}
