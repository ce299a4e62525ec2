use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use n3n_config::FlowDefinition;
use n3n_execution::NodeExecutionContext;
use n3n_expression::ExpressionEvaluator;
use n3n_handler::HandlerRegistry;
use n3n_nodes::builtin_registry;
use n3n_workflow::{DagParser, ParserConfig};

/// n3n - workflow graph validation and node execution
#[derive(Parser)]
#[command(name = "n3n")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a flow definition and print its execution plan
  Validate {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,

    /// Additional node type to accept without a warning (repeatable)
    #[arg(long = "known-type")]
    known_types: Vec<String>,
  },

  /// List the registered node types
  Types,

  /// Print the config schema of a node type
  Schema {
    /// The node type, e.g. "text"
    node_type: String,
  },

  /// Evaluate an expression against the JSON payload read from stdin
  Eval {
    /// Expression, e.g. '{{ $json.user.name }}'
    expression: String,

    /// Treat the argument as a template and print the rendered string
    #[arg(long)]
    template: bool,
  },

  /// Run a single node from a flow with the payload read from stdin
  RunNode {
    /// Path to the flow file (JSON)
    flow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("n3n=info,warn")),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Validate {
      flow_file,
      known_types,
    }) => validate(&flow_file, known_types)?,
    Some(Commands::Types) => list_types()?,
    Some(Commands::Schema { node_type }) => print_schema(&node_type)?,
    Some(Commands::Eval {
      expression,
      template,
    }) => eval(&expression, template)?,
    Some(Commands::RunNode { flow_file, node }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { run_node(&flow_file, &node).await })?;
    }
    None => {
      println!("n3n - use --help to see available commands");
    }
  }

  Ok(())
}

fn registry() -> Result<HandlerRegistry> {
  builtin_registry().context("failed to build handler registry")
}

fn read_flow_value(flow_file: &Path) -> Result<serde_json::Value> {
  let content = std::fs::read_to_string(flow_file)
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))
}

fn validate(flow_file: &Path, known_types: Vec<String>) -> Result<()> {
  let registry = registry()?;
  let config = ParserConfig::default()
    .with_known_types(registry.all_types())
    .with_known_types(known_types);
  let parser = DagParser::new(config);

  let result = parser.parse_value(&read_flow_value(flow_file)?);
  println!("{}", serde_json::to_string_pretty(&result)?);

  if !result.valid {
    bail!(
      "flow definition is invalid ({} error(s))",
      result.errors.len()
    );
  }
  Ok(())
}

fn list_types() -> Result<()> {
  let registry = registry()?;
  println!("{}", serde_json::to_string_pretty(&registry.handler_infos())?);
  Ok(())
}

fn print_schema(node_type: &str) -> Result<()> {
  let registry = registry()?;
  let schema = registry
    .schema_for(node_type)
    .with_context(|| format!("no handler registered for node type: {}", node_type))?;
  println!("{}", serde_json::to_string_pretty(&schema)?);
  Ok(())
}

fn eval(expression: &str, template: bool) -> Result<()> {
  let payload = read_payload_from_stdin()?;
  let ctx = NodeExecutionContext::new(uuid::Uuid::new_v4().to_string(), "eval", "eval")
    .with_input(payload);
  let evaluator = ExpressionEvaluator::new();

  if template {
    println!("{}", evaluator.evaluate_template(expression, &ctx));
  } else {
    println!(
      "{}",
      serde_json::to_string_pretty(&evaluator.evaluate(expression, &ctx))?
    );
  }
  Ok(())
}

async fn run_node(flow_file: &Path, node_id: &str) -> Result<()> {
  let content = tokio::fs::read_to_string(flow_file)
    .await
    .with_context(|| format!("failed to read flow file: {}", flow_file.display()))?;
  let definition = FlowDefinition::from_json_str(&content)
    .with_context(|| format!("failed to parse flow file: {}", flow_file.display()))?;

  let node = definition
    .node(node_id)
    .with_context(|| format!("node '{}' not found in flow", node_id))?;
  let node_type = node
    .node_type
    .clone()
    .with_context(|| format!("node '{}' has no type", node_id))?;

  let payload = read_payload_from_stdin()?;
  let execution_id = uuid::Uuid::new_v4().to_string();
  info!(execution_id = %execution_id, node_id = %node_id, node_type = %node_type, "running node");

  let registry = registry()?;
  let ctx = NodeExecutionContext::new(execution_id, node_id, node_type)
    .with_config(node.config())
    .with_input(payload);
  let result = registry.execute(ctx).await;

  println!("{}", serde_json::to_string_pretty(&result)?);

  if !result.success {
    bail!(
      "node '{}' failed: {}",
      node_id,
      result.error_message.unwrap_or_default()
    );
  }
  Ok(())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(serde_json::json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse payload JSON from stdin")
  }
}
