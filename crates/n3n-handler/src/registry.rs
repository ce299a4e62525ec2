use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use n3n_expression::ExpressionEvaluator;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::executor::execute_node;
use crate::handler::{InterfaceDefinition, NodeHandler};

/// Handler description for editors and tooling.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerInfo {
  #[serde(rename = "type")]
  pub node_type: String,
  pub display_name: String,
  pub description: String,
  pub category: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  pub is_trigger: bool,
  pub supports_async: bool,
  pub config_schema: Value,
  pub interface_definition: InterfaceDefinition,
}

impl HandlerInfo {
  fn from_handler(handler: &dyn NodeHandler) -> Self {
    Self {
      node_type: handler.node_type().to_string(),
      display_name: handler.display_name().to_string(),
      description: handler.description().to_string(),
      category: handler.category().to_string(),
      icon: handler.icon().map(str::to_string),
      is_trigger: handler.is_trigger(),
      supports_async: handler.supports_async(),
      config_schema: handler.config_schema(),
      interface_definition: handler.interface_definition(),
    }
  }
}

/// Lookup from node type to handler.
///
/// Populated once at startup and shared read-only afterwards; lookups need
/// no locking.
#[derive(Default)]
pub struct HandlerRegistry {
  handlers: HashMap<String, Arc<dyn NodeHandler>>,
  evaluator: ExpressionEvaluator,
}

impl HandlerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Use a specific evaluator for config expressions, e.g. one with a
  /// sandboxed environment.
  pub fn with_evaluator(mut self, evaluator: ExpressionEvaluator) -> Self {
    self.evaluator = evaluator;
    self
  }

  /// Register a handler under its type. A second registration for the same
  /// type replaces the first.
  pub fn register(&mut self, handler: impl NodeHandler + 'static) {
    self.register_arc(Arc::new(handler));
  }

  pub fn register_arc(&mut self, handler: Arc<dyn NodeHandler>) {
    let node_type = handler.node_type().to_string();
    if self.handlers.contains_key(&node_type) {
      warn!(node_type = %node_type, "overwriting handler");
    }
    debug!(node_type = %node_type, display_name = %handler.display_name(), "handler registered");
    self.handlers.insert(node_type, handler);
  }

  /// Log the registry contents. Called once boot-time registration is done.
  pub fn log_summary(&self) {
    info!(count = self.handlers.len(), types = ?self.all_types(), "handler registry initialized");
  }

  pub fn find_handler(&self, node_type: &str) -> Option<Arc<dyn NodeHandler>> {
    self.handlers.get(node_type).cloned()
  }

  pub fn has_handler(&self, node_type: &str) -> bool {
    self.handlers.contains_key(node_type)
  }

  /// Registered types, sorted.
  pub fn all_types(&self) -> Vec<String> {
    let mut types: Vec<String> = self.handlers.keys().cloned().collect();
    types.sort();
    types
  }

  pub fn schema_for(&self, node_type: &str) -> Option<Value> {
    self.handlers.get(node_type).map(|h| h.config_schema())
  }

  pub fn handlers_by_category(&self, category: &str) -> Vec<Arc<dyn NodeHandler>> {
    self.sorted_handlers(|h| h.category() == category)
  }

  pub fn trigger_handlers(&self) -> Vec<Arc<dyn NodeHandler>> {
    self.sorted_handlers(|h| h.is_trigger())
  }

  /// Descriptions of every handler, sorted by type.
  pub fn handler_infos(&self) -> Vec<HandlerInfo> {
    self
      .sorted_handlers(|_| true)
      .iter()
      .map(|h| HandlerInfo::from_handler(h.as_ref()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }

  /// Dispatch a node by `ctx.node_type` through the execution boundary.
  ///
  /// An unregistered type yields a failure result. Every result carries
  /// `execution_time_ms`.
  pub async fn execute(&self, ctx: NodeExecutionContext) -> NodeExecutionResult {
    let started = Instant::now();
    match self.find_handler(&ctx.node_type) {
      Some(handler) => execute_node(handler.as_ref(), ctx, &self.evaluator).await,
      None => {
        warn!(node_id = %ctx.node_id, node_type = %ctx.node_type, "no handler registered");
        NodeExecutionResult::failure(format!(
          "No handler registered for node type: {}",
          ctx.node_type
        ))
        .with_execution_time(started.elapsed())
      }
    }
  }

  fn sorted_handlers<F>(&self, filter: F) -> Vec<Arc<dyn NodeHandler>>
  where
    F: Fn(&dyn NodeHandler) -> bool,
  {
    let mut handlers: Vec<Arc<dyn NodeHandler>> = self
      .handlers
      .values()
      .filter(|h| filter(h.as_ref()))
      .cloned()
      .collect();
    handlers.sort_by(|a, b| a.node_type().cmp(b.node_type()));
    handlers
  }
}
