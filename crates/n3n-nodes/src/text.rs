use std::sync::LazyLock;

use async_trait::async_trait;
use n3n_execution::{NodeExecutionContext, NodeExecutionResult};
use n3n_handler::{CatalogError, HandlerError, InterfaceDefinition, PortDef};
use n3n_handler::multiop::{
  Catalog, Credential, FieldDef, MultiOperationHandler, OperationDef, Params, ResourceDef,
};
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::{Value, json};

static CAMEL_BOUNDARY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel boundary pattern"));
static SNAKE_SEPARATORS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[\s-]+").expect("snake separator pattern"));
static KEBAB_SEPARATORS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[\s_]+").expect("kebab separator pattern"));
static WHITESPACE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Upper bound for `pad` output, in characters.
pub const MAX_PAD_LENGTH: usize = 100_000;

/// String manipulation: replace, case, trim, pad, split, join and extract.
pub struct TextHandler;

#[async_trait]
impl MultiOperationHandler for TextHandler {
  fn node_type(&self) -> &str {
    "text"
  }

  fn display_name(&self) -> &str {
    "Text"
  }

  fn description(&self) -> &str {
    "Manipulate, transform, and format text strings."
  }

  fn category(&self) -> &str {
    "Data"
  }

  fn icon(&self) -> Option<&str> {
    Some("text")
  }

  fn interface_definition(&self) -> InterfaceDefinition {
    InterfaceDefinition {
      inputs: vec![PortDef::input("input", "string", false)],
      outputs: vec![PortDef::output("output", "any")],
    }
  }

  fn catalog(&self) -> Result<Catalog, CatalogError> {
    Catalog::builder()
      .resource(
        ResourceDef::new("transform", "Transform").with_description("Transform and modify text"),
        [
          OperationDef::new("replace", "Replace")
            .with_description("Replace text within a string")
            .with_fields([
              text_field(),
              FieldDef::string("search", "Search")
                .with_description("Text to search for")
                .required(),
              FieldDef::string("replaceWith", "Replace With").with_description("Replacement text"),
              FieldDef::boolean("replaceAll", "Replace All")
                .with_default(true)
                .with_description("Replace all occurrences"),
              FieldDef::boolean("ignoreCase", "Ignore Case")
                .with_default(false)
                .with_description("Case-insensitive matching"),
            ])
            .without_credential()
            .with_output_description("Returns modified text"),
          OperationDef::new("case", "Change Case")
            .with_description("Change text case (upper, lower, title, etc.)")
            .with_fields([
              text_field(),
              FieldDef::select(
                "caseType",
                "Case Type",
                [
                  "uppercase",
                  "lowercase",
                  "titlecase",
                  "sentencecase",
                  "camelcase",
                  "snakecase",
                  "kebabcase",
                ],
              )
              .with_default("uppercase")
              .with_description("Type of case conversion")
              .required(),
            ])
            .without_credential()
            .with_output_description("Returns case-converted text"),
          OperationDef::new("trim", "Trim")
            .with_description("Remove whitespace from text")
            .with_fields([
              text_field(),
              FieldDef::select("trimType", "Trim Type", ["both", "start", "end", "all"])
                .with_default("both")
                .with_description("Where to trim (all removes all whitespace)"),
            ])
            .without_credential()
            .with_output_description("Returns trimmed text"),
          OperationDef::new("pad", "Pad")
            .with_description("Pad text to a specific length")
            .with_fields([
              FieldDef::string("text", "Text")
                .with_description("The input text")
                .required(),
              FieldDef::integer("length", "Length")
                .with_description("Target length")
                .with_range(0, MAX_PAD_LENGTH)
                .required(),
              FieldDef::string("padChar", "Pad Character")
                .with_default(" ")
                .with_description("Character to pad with"),
              FieldDef::select("position", "Position", ["start", "end"])
                .with_default("start")
                .with_description("Where to add padding"),
            ])
            .without_credential()
            .with_output_description("Returns padded text"),
        ],
      )
      .resource(
        ResourceDef::new("split", "Split & Join").with_description("Split and join text"),
        [
          OperationDef::new("split", "Split")
            .with_description("Split a string into an array")
            .with_fields([
              text_field(),
              FieldDef::string("separator", "Separator")
                .with_default(",")
                .with_description("Separator to split on"),
              FieldDef::boolean("trim", "Trim Items")
                .with_default(true)
                .with_description("Trim whitespace from each item"),
              FieldDef::boolean("removeEmpty", "Remove Empty")
                .with_default(true)
                .with_description("Remove empty items"),
            ])
            .without_credential()
            .with_output_description("Returns array of strings"),
          OperationDef::new("join", "Join")
            .with_description("Join an array into a string")
            .with_fields([
              FieldDef::textarea("array", "Array")
                .with_description("Array, or an array as JSON text")
                .with_placeholder(r#"["item1", "item2", "item3"]"#)
                .required(),
              FieldDef::string("separator", "Separator")
                .with_default(", ")
                .with_description("Separator between items"),
            ])
            .without_credential()
            .with_output_description("Returns joined string"),
          OperationDef::new("lines", "Split Lines")
            .with_description("Split text into lines")
            .with_fields([
              text_field(),
              FieldDef::boolean("removeEmpty", "Remove Empty Lines")
                .with_default(false)
                .with_description("Remove blank lines"),
            ])
            .without_credential()
            .with_output_description("Returns array of lines"),
        ],
      )
      .resource(
        ResourceDef::new("extract", "Extract").with_description("Extract parts of text"),
        [
          OperationDef::new("substring", "Substring")
            .with_description("Extract a substring")
            .with_fields([
              text_field(),
              FieldDef::integer("start", "Start Index")
                .with_default(0)
                .with_description("Start index (0-based)"),
              FieldDef::integer("end", "End Index")
                .with_description("End index (optional, defaults to end of string)"),
            ])
            .without_credential()
            .with_output_description("Returns substring"),
          OperationDef::new("regex", "Regex Extract")
            .with_description("Extract text using a regular expression")
            .with_fields([
              text_field(),
              FieldDef::string("pattern", "Pattern")
                .with_description("Regular expression pattern")
                .with_placeholder(r"(\d+)")
                .required(),
              FieldDef::boolean("all", "Find All")
                .with_default(false)
                .with_description("Find all matches"),
              FieldDef::boolean("groups", "Include Groups")
                .with_default(true)
                .with_description("Include capture groups"),
            ])
            .without_credential()
            .with_output_description("Returns matched text or array"),
          OperationDef::new("between", "Extract Between")
            .with_description("Extract text between two markers")
            .with_fields([
              text_field(),
              FieldDef::string("startMarker", "Start Marker")
                .with_description("Start marker text")
                .required(),
              FieldDef::string("endMarker", "End Marker")
                .with_description("End marker text")
                .required(),
              FieldDef::boolean("all", "Find All")
                .with_default(false)
                .with_description("Find all occurrences"),
            ])
            .without_credential()
            .with_output_description("Returns extracted text"),
          OperationDef::new("length", "Length")
            .with_description("Count characters, words and lines")
            .with_field(text_field())
            .without_credential()
            .with_output_description("Returns character count"),
        ],
      )
      .build()
  }

  async fn execute_operation(
    &self,
    _ctx: &NodeExecutionContext,
    resource: &str,
    operation: &str,
    _credential: &Credential,
    params: &Params,
  ) -> Result<NodeExecutionResult, HandlerError> {
    match (resource, operation) {
      ("transform", "replace") => replace(params),
      ("transform", "case") => change_case(params),
      ("transform", "trim") => trim(params),
      ("transform", "pad") => pad(params),
      ("split", "split") => split(params),
      ("split", "join") => join(params),
      ("split", "lines") => lines(params),
      ("extract", "substring") => substring(params),
      ("extract", "regex") => regex_extract(params),
      ("extract", "between") => between(params),
      ("extract", "length") => length(params),
      _ => Ok(NodeExecutionResult::failure(format!(
        "Unsupported text operation: {}.{}",
        resource, operation
      ))),
    }
  }
}

fn text_field() -> FieldDef {
  FieldDef::textarea("text", "Text")
    .with_description("The input text")
    .required()
}

fn text_result(text: impl Into<String>) -> Result<NodeExecutionResult, HandlerError> {
  Ok(NodeExecutionResult::success(json!({ "text": text.into() })))
}

fn replace(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let search = params.required_str("search")?;
  let replacement = params.str_or("replaceWith", "");
  let replace_all = params.bool_or("replaceAll", true);

  if params.bool_or("ignoreCase", false) {
    let pattern = RegexBuilder::new(&regex::escape(&search))
      .case_insensitive(true)
      .build()
      .map_err(|e| HandlerError::invalid("search", e.to_string()))?;
    let replaced = if replace_all {
      pattern.replace_all(&text, NoExpand(&replacement))
    } else {
      pattern.replace(&text, NoExpand(&replacement))
    };
    return text_result(replaced);
  }

  if replace_all {
    text_result(text.replace(&search, &replacement))
  } else {
    text_result(text.replacen(&search, &replacement, 1))
  }
}

fn change_case(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let converted = match params.str_or("caseType", "uppercase").as_str() {
    "uppercase" => text.to_uppercase(),
    "lowercase" => text.to_lowercase(),
    "titlecase" => title_case(&text),
    "sentencecase" => sentence_case(&text),
    "camelcase" => camel_case(&text),
    "snakecase" => separated_case(&text, &SNAKE_SEPARATORS, "_"),
    "kebabcase" => separated_case(&text, &KEBAB_SEPARATORS, "-"),
    _ => text,
  };
  text_result(converted)
}

fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut capitalize = true;
  for c in text.chars() {
    if c.is_whitespace() {
      capitalize = true;
      out.push(c);
    } else if capitalize {
      out.extend(c.to_uppercase());
      capitalize = false;
    } else {
      out.extend(c.to_lowercase());
    }
  }
  out
}

fn sentence_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut capitalize = true;
  for c in text.chars() {
    if matches!(c, '.' | '!' | '?') {
      capitalize = true;
      out.push(c);
    } else if capitalize && c.is_alphabetic() {
      out.extend(c.to_uppercase());
      capitalize = false;
    } else {
      out.extend(c.to_lowercase());
    }
  }
  out
}

fn camel_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut capitalize = false;
  for c in text.chars() {
    if matches!(c, ' ' | '_' | '-') {
      capitalize = true;
    } else if capitalize {
      out.extend(c.to_uppercase());
      capitalize = false;
    } else {
      out.extend(c.to_lowercase());
    }
  }
  out
}

fn separated_case(text: &str, separators: &Regex, joiner: &str) -> String {
  let split = CAMEL_BOUNDARY.replace_all(text, format!("${{1}}{}${{2}}", joiner));
  separators.replace_all(&split, joiner).to_lowercase()
}

fn trim(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let trimmed = match params.str_or("trimType", "both").as_str() {
    "start" => text.trim_start().to_string(),
    "end" => text.trim_end().to_string(),
    "all" => WHITESPACE.replace_all(&text, "").into_owned(),
    _ => text.trim().to_string(),
  };
  text_result(trimmed)
}

fn pad(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let length = params.required_i64("length")?;
  let target = usize::try_from(length)
    .ok()
    .filter(|t| *t <= MAX_PAD_LENGTH)
    .ok_or_else(|| {
      HandlerError::invalid(
        "length",
        format!("must be between 0 and {}, got {}", MAX_PAD_LENGTH, length),
      )
    })?;
  let pad_char = params.str_or("padChar", " ").chars().next().unwrap_or(' ');

  let current = text.chars().count();
  if current >= target {
    return text_result(text);
  }

  let padding: String = std::iter::repeat_n(pad_char, target - current).collect();
  if params.str_or("position", "start") == "start" {
    text_result(padding + &text)
  } else {
    text_result(text + &padding)
  }
}

fn split(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let separator = params.str_or("separator", ",");
  let trim_items = params.bool_or("trim", true);
  let remove_empty = params.bool_or("removeEmpty", true);

  let items: Vec<&str> = text
    .split(separator.as_str())
    .map(|item| if trim_items { item.trim() } else { item })
    .filter(|item| !remove_empty || !item.is_empty())
    .collect();

  Ok(NodeExecutionResult::success(json!({
    "items": items,
    "count": items.len(),
  })))
}

fn join(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let separator = params.str_or("separator", ", ");
  let items = match params.get("array") {
    Some(Value::Array(items)) => items.clone(),
    Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw)? {
      Value::Array(items) => items,
      _ => return Err(HandlerError::invalid("array", "expected a JSON array")),
    },
    _ => return Err(HandlerError::invalid("array", "expected a JSON array")),
  };

  let joined = items
    .iter()
    .map(|item| match item {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    })
    .collect::<Vec<_>>()
    .join(&separator);
  text_result(joined)
}

fn lines(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let remove_empty = params.bool_or("removeEmpty", false);

  let lines: Vec<&str> = text
    .lines()
    .filter(|line| !remove_empty || !line.trim().is_empty())
    .collect();

  Ok(NodeExecutionResult::success(json!({
    "lines": lines,
    "count": lines.len(),
  })))
}

/// Character-indexed, clamped to the text; a negative or missing end means
/// the end of the text.
fn substring(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let len = text.chars().count();
  let start = usize::try_from(params.i64_or("start", 0)).unwrap_or(0).min(len);
  let end = match params.i64_or("end", -1) {
    end if end < 0 => len,
    end => usize::try_from(end).unwrap_or(len).min(len),
  };

  let taken: String = text
    .chars()
    .skip(start)
    .take(end.saturating_sub(start))
    .collect();
  text_result(taken)
}

fn regex_extract(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let pattern = Regex::new(&params.required_str("pattern")?)
    .map_err(|e| HandlerError::invalid("pattern", e.to_string()))?;
  let find_all = params.bool_or("all", false);
  let with_groups = params.bool_or("groups", true) && pattern.captures_len() > 1;

  let groups = |caps: &regex::Captures| -> Value {
    caps
      .iter()
      .map(|g| g.map_or(Value::Null, |m| Value::String(m.as_str().to_string())))
      .collect()
  };

  if find_all {
    let matches: Vec<Value> = pattern
      .captures_iter(&text)
      .map(|caps| {
        if with_groups {
          groups(&caps)
        } else {
          Value::String(caps[0].to_string())
        }
      })
      .collect();
    return Ok(NodeExecutionResult::success(json!({
      "matches": matches,
      "count": matches.len(),
    })));
  }

  let output = match pattern.captures(&text) {
    Some(caps) if with_groups => json!({ "match": &caps[0], "groups": groups(&caps), "found": true }),
    Some(caps) => json!({ "match": &caps[0], "found": true }),
    None => json!({ "match": "", "found": false }),
  };
  Ok(NodeExecutionResult::success(output))
}

fn between(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  let start = params.required_str("startMarker")?;
  let end = params.required_str("endMarker")?;
  let pattern = Regex::new(&format!(
    "(?s){}(.*?){}",
    regex::escape(&start),
    regex::escape(&end)
  ))
  .map_err(|e| HandlerError::invalid("startMarker", e.to_string()))?;

  if params.bool_or("all", false) {
    let matches: Vec<&str> = pattern
      .captures_iter(&text)
      .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
      .collect();
    return Ok(NodeExecutionResult::success(json!({
      "matches": matches,
      "count": matches.len(),
    })));
  }

  let output = match pattern.captures(&text).and_then(|caps| caps.get(1)) {
    Some(m) => json!({ "text": m.as_str(), "found": true }),
    None => json!({ "text": "", "found": false }),
  };
  Ok(NodeExecutionResult::success(output))
}

fn length(params: &Params) -> Result<NodeExecutionResult, HandlerError> {
  let text = params.required_str("text")?;
  Ok(NodeExecutionResult::success(json!({
    "length": text.chars().count(),
    "words": text.split_whitespace().count(),
    "lines": text.lines().count(),
  })))
}
