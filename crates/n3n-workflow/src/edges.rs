use std::collections::BTreeMap;

use n3n_config::{EdgeType, FlowDefinition, FlowEdge};

/// Outgoing edges of `source` with the given classification, in declaration order.
pub fn edges_by_type<'a>(
  definition: &'a FlowDefinition,
  source: &str,
  edge_type: EdgeType,
) -> Vec<&'a FlowEdge> {
  definition
    .edges
    .iter()
    .filter(|e| e.source == source && e.kind() == edge_type)
    .collect()
}

/// Outgoing edges of `source` grouped by classification.
///
/// Every [`EdgeType`] is present as a key, possibly with an empty list.
pub fn outgoing_edges_by_type<'a>(
  definition: &'a FlowDefinition,
  source: &str,
) -> BTreeMap<EdgeType, Vec<&'a FlowEdge>> {
  let mut grouped: BTreeMap<EdgeType, Vec<&FlowEdge>> =
    EdgeType::ALL.iter().map(|t| (*t, Vec::new())).collect();

  for edge in definition.edges.iter().filter(|e| e.source == source) {
    grouped.entry(edge.kind()).or_default().push(edge);
  }

  grouped
}

/// Edges an orchestrator should follow after `source` completes.
///
/// A successful node fires its `success` and `always` edges, a failed node
/// its `error` and `always` edges. When the node restricted its branches,
/// only edges whose label, source handle or target is listed are kept.
pub fn traversable_edges<'a>(
  definition: &'a FlowDefinition,
  source: &str,
  succeeded: bool,
  branches: Option<&[String]>,
) -> Vec<&'a FlowEdge> {
  let outcome = if succeeded {
    EdgeType::Success
  } else {
    EdgeType::Error
  };

  definition
    .edges
    .iter()
    .filter(|e| e.source == source)
    .filter(|e| {
      let kind = e.kind();
      kind == outcome || kind == EdgeType::Always
    })
    .filter(|e| branches.is_none_or(|selected| edge_selected(e, selected)))
    .collect()
}

fn edge_selected(edge: &FlowEdge, selected: &[String]) -> bool {
  selected.iter().any(|branch| {
    edge.label.as_deref() == Some(branch.as_str())
      || edge.source_handle.as_deref() == Some(branch.as_str())
      || edge.target == *branch
  })
}
