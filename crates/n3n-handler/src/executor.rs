use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use n3n_expression::ExpressionEvaluator;
use tracing::{debug, error, instrument, warn};

use crate::handler::NodeHandler;

/// Run a handler behind the failure boundary.
///
/// 1. Resolve `{{ }}` expressions in the node config.
/// 2. Validate the resolved config.
/// 3. Execute, catching returned errors and panics.
///
/// The orchestrator only ever sees a structured result, with
/// `execution_time_ms` recorded.
#[instrument(
  name = "node_execute",
  skip(handler, ctx, evaluator),
  fields(
    execution_id = %ctx.execution_id,
    node_id = %ctx.node_id,
    node_type = %handler.node_type(),
  )
)]
pub async fn execute_node(
  handler: &dyn NodeHandler,
  mut ctx: NodeExecutionContext,
  evaluator: &ExpressionEvaluator,
) -> NodeExecutionResult {
  let started = Instant::now();

  ctx.node_config = evaluator.evaluate_config(&ctx.node_config, &ctx);

  let validation = handler.validate_config(&ctx.node_config);
  if !validation.is_valid() {
    warn!(errors = %validation.summary(), "config validation failed");
    return NodeExecutionResult::failure(format!(
      "Configuration validation failed: {}",
      validation.summary()
    ))
    .with_execution_time(started.elapsed());
  }

  let outcome = AssertUnwindSafe(handler.execute(&ctx)).catch_unwind().await;

  let result = match outcome {
    Ok(Ok(result)) => result,
    Ok(Err(e)) => {
      error!(error = %e, "node execution failed");
      NodeExecutionResult::failure(e.to_string())
    }
    Err(payload) => {
      let message = panic_message(payload.as_ref());
      error!(panic = %message, "node handler panicked");
      NodeExecutionResult::failure(format!("Node handler panicked: {}", message))
    }
  };

  let elapsed = started.elapsed();
  debug!(
    success = result.success,
    elapsed_ms = elapsed.as_millis() as u64,
    "node completed"
  );
  result.with_execution_time(elapsed)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_panic_message() {
    let boxed: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_message(boxed.as_ref()), "boom");

    let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
    assert_eq!(panic_message(boxed.as_ref()), "bang");

    let boxed: Box<dyn Any + Send> = Box::new(7_u8);
    assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
  }
}
