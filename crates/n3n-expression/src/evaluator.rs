use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use n3n_execution::{NodeExecutionContext, ValidationResult};
use regex::{Captures, Regex};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::path::resolve_path;

static EXPRESSION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{\s*(.+?)\s*\}\}").expect("expression pattern"));
static FIELD_PATH: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\$([a-zA-Z_][a-zA-Z0-9_]*)(?:\.(.+))?$").expect("field path pattern")
});
static NODE_REF: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^\$node\["([^"]+)"\]\.json(?:\.(.+))?$"#).expect("node reference pattern")
});
static ENV_VAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\$env\.([a-zA-Z_][a-zA-Z0-9_]*)$").expect("env pattern"));

const ROOTS: &[&str] = &["json", "input", "execution", "workflow", "flow", "global"];

/// Where `$env.NAME` reads from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
  /// The process environment.
  #[default]
  Process,
  /// A fixed map, for sandboxed evaluation.
  Fixed(HashMap<String, String>),
}

impl EnvSource {
  fn get(&self, name: &str) -> Option<String> {
    match self {
      EnvSource::Process => std::env::var(name).ok(),
      EnvSource::Fixed(vars) => vars.get(name).cloned(),
    }
  }
}

/// Resolves `{{ ... }}` expressions against a [`NodeExecutionContext`].
///
/// Stateless apart from the environment source, so one evaluator can be
/// shared by every execution.
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator {
  env: EnvSource,
}

impl ExpressionEvaluator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Evaluator whose `$env` only sees the given variables.
  pub fn with_env(vars: HashMap<String, String>) -> Self {
    Self {
      env: EnvSource::Fixed(vars),
    }
  }

  /// Evaluate one expression, with or without surrounding braces.
  ///
  /// Returns the typed value, or `Value::Null` when nothing resolves.
  pub fn evaluate(&self, expression: &str, ctx: &NodeExecutionContext) -> Value {
    self.evaluate_expression(strip_braces(expression), ctx)
  }

  /// Replace every `{{ expr }}` in `template` with the string form of its value.
  ///
  /// Absent values render as the empty string, strings render without
  /// quotes and everything else renders as JSON.
  pub fn evaluate_template(&self, template: &str, ctx: &NodeExecutionContext) -> String {
    EXPRESSION
      .replace_all(template, |caps: &Captures| {
        render(&self.evaluate_expression(caps[1].trim(), ctx))
      })
      .into_owned()
  }

  /// Resolve expressions throughout a config map.
  ///
  /// A string that is exactly one expression is replaced by the typed value.
  /// Other strings containing expressions are rendered as templates. Maps and
  /// lists are walked recursively, everything else is left untouched.
  pub fn evaluate_config(
    &self,
    config: &Map<String, Value>,
    ctx: &NodeExecutionContext,
  ) -> Map<String, Value> {
    config
      .iter()
      .map(|(key, value)| (key.clone(), self.evaluate_value(value, ctx)))
      .collect()
  }

  pub fn evaluate_value(&self, value: &Value, ctx: &NodeExecutionContext) -> Value {
    match value {
      Value::String(s) => match whole_expression(s) {
        Some(expr) => self.evaluate_expression(expr, ctx),
        None if self.contains_expression(s) => Value::String(self.evaluate_template(s, ctx)),
        None => value.clone(),
      },
      Value::Object(map) => Value::Object(self.evaluate_config(map, ctx)),
      Value::Array(items) => Value::Array(
        items
          .iter()
          .map(|item| self.evaluate_value(item, ctx))
          .collect(),
      ),
      _ => value.clone(),
    }
  }

  pub fn contains_expression(&self, value: &str) -> bool {
    EXPRESSION.is_match(value)
  }

  /// Authoring-time check of an expression's shape. Nothing is resolved.
  pub fn validate_expression(&self, expression: &str) -> ValidationResult {
    let expr = strip_braces(expression);
    if expr.is_empty() {
      return ValidationResult::valid();
    }
    if !expr.starts_with('$') {
      return ValidationResult::invalid("expression", "Expression must start with $");
    }

    let known = expr == "$now"
      || expr == "$timestamp"
      || ENV_VAR.is_match(expr)
      || NODE_REF.is_match(expr)
      || FIELD_PATH
        .captures(expr)
        .is_some_and(|caps| ROOTS.contains(&&caps[1]));

    if known {
      ValidationResult::valid()
    } else {
      ValidationResult::invalid("expression", format!("Unknown expression type: {}", expr))
    }
  }

  fn evaluate_expression(&self, expr: &str, ctx: &NodeExecutionContext) -> Value {
    if expr.is_empty() {
      return Value::Null;
    }
    if expr == "$now" {
      return Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    if expr == "$timestamp" {
      return json!(Utc::now().timestamp_millis());
    }

    if let Some(caps) = ENV_VAR.captures(expr) {
      return self.env.get(&caps[1]).map(Value::String).unwrap_or(Value::Null);
    }

    if let Some(caps) = NODE_REF.captures(expr) {
      let node = &caps[1];
      let Some(output) = ctx.previous_output(node) else {
        debug!(node_id = %ctx.node_id, referenced = %node, "expression references unknown node");
        return Value::Null;
      };
      return lookup(output, caps.get(2).map(|m| m.as_str()));
    }

    if let Some(caps) = FIELD_PATH.captures(expr) {
      let name = &caps[1];
      let Some(root) = root_value(name, ctx) else {
        debug!(node_id = %ctx.node_id, root = %name, "unknown expression root");
        return Value::Null;
      };
      return lookup(&root, caps.get(2).map(|m| m.as_str()));
    }

    debug!(node_id = %ctx.node_id, expression = %expr, "unrecognized expression");
    Value::Null
  }
}

fn root_value(name: &str, ctx: &NodeExecutionContext) -> Option<Value> {
  match name {
    "json" | "input" => Some(ctx.input_data.clone()),
    "execution" => Some(json!({
      "id": ctx.execution_id,
      "nodeId": ctx.node_id,
    })),
    "workflow" | "flow" => Some(json!({
      "id": ctx.flow_id,
      "version": ctx.flow_version,
    })),
    "global" => Some(Value::Object(ctx.global_context.clone())),
    _ => None,
  }
}

fn lookup(root: &Value, path: Option<&str>) -> Value {
  match path {
    None => root.clone(),
    Some(path) => resolve_path(root, path).cloned().unwrap_or(Value::Null),
  }
}

fn strip_braces(expression: &str) -> &str {
  let trimmed = expression.trim();
  trimmed
    .strip_prefix("{{")
    .and_then(|rest| rest.strip_suffix("}}"))
    .map(str::trim)
    .unwrap_or(trimmed)
}

/// The inner expression when `s` consists of exactly one `{{ }}` block.
fn whole_expression(s: &str) -> Option<&str> {
  let caps = EXPRESSION.captures(s)?;
  let whole = caps.get(0)?;
  if whole.start() == 0 && whole.end() == s.len() {
    caps.get(1).map(|m| m.as_str().trim())
  } else {
    None
  }
}

fn render(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
