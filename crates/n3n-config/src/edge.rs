use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// When an edge should be traversed relative to its source node's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
  /// Followed only when the source node succeeded. Missing edge types map here.
  Success,
  /// Followed only when the source node failed.
  Error,
  /// Followed regardless of the source node's outcome.
  Always,
}

impl EdgeType {
  pub const ALL: [EdgeType; 3] = [EdgeType::Success, EdgeType::Error, EdgeType::Always];

  pub fn as_str(&self) -> &'static str {
    match self {
      EdgeType::Success => "success",
      EdgeType::Error => "error",
      EdgeType::Always => "always",
    }
  }
}

impl fmt::Display for EdgeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EdgeType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "success" => Ok(EdgeType::Success),
      "error" => Ok(EdgeType::Error),
      "always" => Ok(EdgeType::Always),
      other => Err(format!("unknown edge type: {}", other)),
    }
  }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default)]
  pub source: String,
  #[serde(default)]
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
  /// Raw edge type as authored. Use [`FlowEdge::kind`] for the classification.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub edge_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl FlowEdge {
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      target: target.into(),
      ..Default::default()
    }
  }

  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn with_type(mut self, edge_type: EdgeType) -> Self {
    self.edge_type = Some(edge_type.as_str().to_string());
    self
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
    self.source_handle = Some(handle.into());
    self
  }

  /// Classify this edge. Anything other than `error` or `always` is a success edge.
  pub fn kind(&self) -> EdgeType {
    match self.edge_type.as_deref() {
      Some("error") => EdgeType::Error,
      Some("always") => EdgeType::Always,
      _ => EdgeType::Success,
    }
  }

  /// True when the authored edge type is set but not one of the known values.
  pub fn has_unrecognized_type(&self) -> bool {
    self
      .edge_type
      .as_deref()
      .is_some_and(|t| t.parse::<EdgeType>().is_err())
  }

  pub fn is_success_edge(&self) -> bool {
    self.kind() == EdgeType::Success
  }

  pub fn is_error_edge(&self) -> bool {
    self.kind() == EdgeType::Error
  }

  pub fn is_always_edge(&self) -> bool {
    self.kind() == EdgeType::Always
  }

  /// Human-readable identity for diagnostics.
  pub fn describe(&self) -> String {
    match &self.id {
      Some(id) => format!("{} ({} -> {})", id, self.source, self.target),
      None => format!("{} -> {}", self.source, self.target),
    }
  }
}
