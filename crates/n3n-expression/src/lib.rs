//! n3n Expressions
//!
//! A small, non-Turing-complete interpreter for `{{ ... }}` expressions in
//! node configuration. Expressions read from the current node's input,
//! upstream node outputs, execution and flow metadata, the global context,
//! the environment and the clock.
//!
//! Resolution misses (unknown node, absent path, bad index) evaluate to
//! `null` instead of failing. Syntax problems are only reported by
//! [`ExpressionEvaluator::validate_expression`].

mod evaluator;
mod path;

pub use evaluator::{EnvSource, ExpressionEvaluator};
pub use path::resolve_path;
