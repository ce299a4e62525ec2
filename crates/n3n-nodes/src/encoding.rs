use async_trait::async_trait;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{
  GeneralPurpose, GeneralPurposeConfig, STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD,
};
use base64::engine::DecodePaddingMode;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use n3n_handler::multiop::Params;
use n3n_handler::{HandlerError, NodeHandler};
use serde_json::{Value, json};

const LENIENT: GeneralPurposeConfig =
  GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Decoders accept input with or without trailing `=`.
const STANDARD_DECODER: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_DECODER: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Base64 encode, decode and validate.
///
/// The text comes from the `input` config value, falling back to the `data`,
/// `input` or `text` keys of the node's input data.
pub struct Base64Handler;

fn input_text(ctx: &NodeExecutionContext, params: &Params) -> String {
  let configured = params.str_or("input", "");
  if !configured.is_empty() {
    return configured;
  }
  ["data", "input", "text"]
    .iter()
    .find_map(|key| match ctx.input_value(key) {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) => Some(s.clone()),
      Some(other) => Some(other.to_string()),
    })
    .unwrap_or_default()
}

fn decoder(url_safe: bool) -> &'static GeneralPurpose {
  if url_safe { &URL_SAFE_DECODER } else { &STANDARD_DECODER }
}

#[async_trait]
impl NodeHandler for Base64Handler {
  fn node_type(&self) -> &str {
    "base64"
  }

  fn display_name(&self) -> &str {
    "Base64"
  }

  fn description(&self) -> &str {
    "Encode and decode Base64 strings."
  }

  fn category(&self) -> &str {
    "Data Transformation"
  }

  fn icon(&self) -> Option<&str> {
    Some("code")
  }

  fn config_schema(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "operation": {
          "type": "string",
          "title": "Operation",
          "enum": ["encode", "decode", "validate"],
          "default": "encode"
        },
        "input": {
          "type": "string",
          "title": "Input",
          "description": "The text to encode/decode"
        },
        "urlSafe": {
          "type": "boolean",
          "title": "URL Safe",
          "description": "Use URL-safe Base64 variant",
          "default": false
        },
        "noPadding": {
          "type": "boolean",
          "title": "No Padding",
          "description": "Omit padding characters (=) in encoded output",
          "default": false
        }
      },
      "required": ["operation"]
    })
  }

  async fn execute(&self, ctx: &NodeExecutionContext) -> Result<NodeExecutionResult, HandlerError> {
    let params = Params::new(ctx.node_config.clone());
    let operation = params.str_or("operation", "encode");
    let url_safe = params.bool_or("urlSafe", false);

    let input = input_text(ctx, &params);
    if input.is_empty() {
      return Ok(NodeExecutionResult::failure(
        "Input data is required for Base64 operation.",
      ));
    }

    let result = match operation.as_str() {
      "encode" => {
        let engine = match (url_safe, params.bool_or("noPadding", false)) {
          (false, false) => &STANDARD,
          (false, true) => &STANDARD_NO_PAD,
          (true, false) => &URL_SAFE,
          (true, true) => &URL_SAFE_NO_PAD,
        };
        engine.encode(input.as_bytes())
      }
      "decode" => match decoder(url_safe).decode(input.trim()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
          return Ok(NodeExecutionResult::failure(format!(
            "Base64 decode failed: {}",
            e
          )));
        }
      },
      "validate" => {
        let is_valid = decoder(url_safe).decode(input.trim()).is_ok();
        return Ok(NodeExecutionResult::success(json!({
          "isValid": is_valid,
          "input": input,
        })));
      }
      other => {
        return Ok(NodeExecutionResult::failure(format!(
          "Unknown operation: {}",
          other
        )));
      }
    };

    Ok(NodeExecutionResult::success(json!({
      "result": result,
      "operation": operation,
      "inputLength": input.chars().count(),
      "outputLength": result.chars().count(),
    })))
  }
}
