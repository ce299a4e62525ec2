use std::collections::{HashMap, HashSet, VecDeque};

use n3n_config::FlowDefinition;

use crate::result::ParseResult;

/// Structurally valid view of a flow: declared nodes plus deduplicated edges.
///
/// Only structurally valid edges participate: both endpoints exist and the
/// edge is not a self-loop. Parallel edges between the same pair of nodes
/// (for example one `success` and one `error` edge) count once.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
  /// Node ids in declaration order, without duplicates.
  node_ids: Vec<String>,
  /// source -> targets, in edge declaration order.
  adjacency: HashMap<String, Vec<String>>,
  /// target -> sources.
  reverse_adjacency: HashMap<String, Vec<String>>,
}

impl FlowGraph {
  /// Build a graph from a flow definition, discarding diagnostics.
  pub fn new(definition: &FlowDefinition) -> Self {
    let mut scratch = ParseResult::new();
    Self::build(definition, &mut scratch)
  }

  /// Build a graph, recording node and edge problems into `result`.
  pub(crate) fn build(definition: &FlowDefinition, result: &mut ParseResult) -> Self {
    let mut graph = FlowGraph::default();
    let mut known: HashSet<&str> = HashSet::new();

    for (index, node) in definition.nodes.iter().enumerate() {
      if node.id.is_empty() {
        result.add_error(format!("Node at index {} has no id", index));
        continue;
      }
      if !known.insert(node.id.as_str()) {
        result.add_error(format!("Duplicate node id: {}", node.id));
        continue;
      }
      graph.node_ids.push(node.id.clone());
      graph.adjacency.insert(node.id.clone(), Vec::new());
      graph.reverse_adjacency.insert(node.id.clone(), Vec::new());
    }

    for edge in &definition.edges {
      if !known.contains(edge.source.as_str()) {
        result.add_error(format!(
          "Edge references non-existent source node: {}",
          edge.source
        ));
        continue;
      }
      if !known.contains(edge.target.as_str()) {
        result.add_error(format!(
          "Edge references non-existent target node: {}",
          edge.target
        ));
        continue;
      }
      if edge.source == edge.target {
        result.add_error(format!("Self-loop detected on node: {}", edge.source));
        continue;
      }
      if edge.has_unrecognized_type() {
        result.add_warning(format!(
          "Edge {} has unknown edge type: {}; treating as success",
          edge.describe(),
          edge.edge_type.as_deref().unwrap_or_default()
        ));
      }

      let downstream = graph.adjacency.entry(edge.source.clone()).or_default();
      if downstream.contains(&edge.target) {
        continue;
      }
      downstream.push(edge.target.clone());
      graph
        .reverse_adjacency
        .entry(edge.target.clone())
        .or_default()
        .push(edge.source.clone());
    }

    graph
  }

  /// All node ids in declaration order.
  pub fn node_ids(&self) -> &[String] {
    &self.node_ids
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.adjacency.contains_key(node_id)
  }

  /// Get entry points (nodes with no incoming edges).
  pub fn entry_points(&self) -> Vec<String> {
    self
      .node_ids
      .iter()
      .filter(|id| self.upstream(id).is_empty())
      .cloned()
      .collect()
  }

  /// Get exit points (nodes with no outgoing edges).
  pub fn exit_points(&self) -> Vec<String> {
    self
      .node_ids
      .iter()
      .filter(|id| self.downstream(id).is_empty())
      .cloned()
      .collect()
  }

  /// Direct successors, empty for an unknown node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Direct predecessors, empty for an unknown node.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Check if a node is a join point (has multiple incoming edges).
  pub fn is_join_point(&self, node_id: &str) -> bool {
    self.upstream(node_id).len() > 1
  }

  /// Topological order via Kahn's algorithm, or `None` if the graph has a cycle.
  ///
  /// Ties are broken by declaration order, so the same definition always
  /// yields the same order.
  pub fn topological_order(&self) -> Option<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = self
      .node_ids
      .iter()
      .map(|id| (id.as_str(), self.upstream(id).len()))
      .collect();

    let mut queue: VecDeque<&str> = self
      .node_ids
      .iter()
      .map(String::as_str)
      .filter(|id| in_degree.get(id) == Some(&0))
      .collect();

    let mut order = Vec::with_capacity(self.node_ids.len());
    while let Some(node) = queue.pop_front() {
      order.push(node.to_string());
      for next in self.downstream(node) {
        if let Some(degree) = in_degree.get_mut(next.as_str()) {
          *degree -= 1;
          if *degree == 0 {
            queue.push_back(next.as_str());
          }
        }
      }
    }

    (order.len() == self.node_ids.len()).then_some(order)
  }
}
