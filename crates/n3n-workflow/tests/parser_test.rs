use std::collections::BTreeSet;

use n3n_config::{EdgeType, FlowDefinition, FlowEdge, FlowNode};
use n3n_workflow::{DagParser, ParseResult, edges_by_type, execution_order, is_valid_dag};
use serde_json::json;

fn parse(value: serde_json::Value) -> ParseResult {
  DagParser::default().parse_value(&value)
}

fn position(order: &[String], id: &str) -> usize {
  order
    .iter()
    .position(|n| n == id)
    .unwrap_or_else(|| panic!("{} missing from order", id))
}

#[test]
fn test_parse_is_idempotent() {
  let flow = json!({
    "nodes": [
      { "id": "t", "type": "trigger" },
      { "id": "a", "type": "action" },
      { "id": "b", "type": "action" },
      { "id": "o", "type": "output" },
      { "id": "x", "type": "mystery" }
    ],
    "edges": [
      { "source": "t", "target": "a" },
      { "source": "t", "target": "b" },
      { "source": "a", "target": "o" },
      { "source": "b", "target": "o", "edgeType": "error" },
      { "source": "b", "target": "ghost" }
    ]
  });

  let first = parse(flow.clone());
  let second = parse(flow);
  assert_eq!(first, second);
}

#[test]
fn test_order_respects_every_edge() {
  let flow = json!({
    "nodes": [
      { "id": "e", "type": "output" },
      { "id": "d", "type": "action" },
      { "id": "c", "type": "action" },
      { "id": "b", "type": "action" },
      { "id": "a", "type": "trigger" }
    ],
    "edges": [
      { "source": "a", "target": "b" },
      { "source": "a", "target": "c" },
      { "source": "b", "target": "d" },
      { "source": "c", "target": "d", "edgeType": "always" },
      { "source": "d", "target": "e" }
    ]
  });

  let result = parse(flow.clone());
  assert!(result.valid, "errors: {:?}", result.errors);
  assert_eq!(result.execution_order.len(), 5);

  for edge in flow["edges"].as_array().unwrap() {
    let source = edge["source"].as_str().unwrap();
    let target = edge["target"].as_str().unwrap();
    assert!(
      position(&result.execution_order, source) < position(&result.execution_order, target),
      "{} should run before {}",
      source,
      target
    );
  }
}

#[test]
fn test_three_node_cycle() {
  let result = parse(json!({
    "nodes": [
      { "id": "A", "type": "action" },
      { "id": "B", "type": "action" },
      { "id": "C", "type": "action" }
    ],
    "edges": [
      { "source": "A", "target": "B" },
      { "source": "B", "target": "C" },
      { "source": "C", "target": "A" }
    ]
  }));

  assert!(!result.valid);
  assert!(result.execution_order.is_empty());
  assert!(result.errors.iter().any(|e| e.contains("DAG")));
  assert!(result.errors.iter().any(|e| e.contains("no entry points")));
  assert!(result.warnings.iter().any(|w| w.contains("no exit points")));
}

#[test]
fn test_cycle_behind_an_entry_point() {
  let result = parse(json!({
    "nodes": [
      { "id": "start", "type": "trigger" },
      { "id": "B", "type": "action" },
      { "id": "C", "type": "action" }
    ],
    "edges": [
      { "source": "start", "target": "B" },
      { "source": "B", "target": "C" },
      { "source": "C", "target": "B" }
    ]
  }));

  assert!(!result.valid);
  assert_eq!(result.entry_points, vec!["start"]);
  assert!(result.execution_order.is_empty());
  assert_eq!(
    result.errors,
    vec!["Cycle detected in flow - flow must be a DAG (Directed Acyclic Graph)"]
  );
}

#[test]
fn test_entry_and_exit_points() {
  let result = parse(json!({
    "nodes": [
      { "id": "A", "type": "trigger" },
      { "id": "B", "type": "action" },
      { "id": "C", "type": "output" }
    ],
    "edges": [
      { "id": "e1", "source": "A", "target": "B" },
      { "id": "e2", "source": "B", "target": "C" }
    ]
  }));

  assert!(result.valid);
  assert_eq!(result.entry_points, vec!["A"]);
  assert_eq!(result.exit_points, vec!["C"]);
  assert_eq!(result.execution_order, vec!["A", "B", "C"]);
  assert_eq!(
    result.dependencies_of("C"),
    Some(&BTreeSet::from(["B".to_string()]))
  );
  assert_eq!(result.dependencies_of("A"), Some(&BTreeSet::new()));
}

#[test]
fn test_dangling_edge_is_excluded() {
  let result = parse(json!({
    "nodes": [
      { "id": "A", "type": "trigger" },
      { "id": "B", "type": "output" }
    ],
    "edges": [
      { "source": "A", "target": "B" },
      { "source": "ghost", "target": "B" },
      { "source": "A", "target": "phantom" }
    ]
  }));

  assert!(!result.valid);
  assert_eq!(
    result.errors,
    vec![
      "Edge references non-existent source node: ghost",
      "Edge references non-existent target node: phantom",
    ]
  );
  assert_eq!(
    result.dependencies_of("B"),
    Some(&BTreeSet::from(["A".to_string()]))
  );
  assert!(result.dependencies_of("phantom").is_none());
  assert!(result.dependencies.values().all(|deps| !deps.contains("ghost")));
}

#[test]
fn test_self_loop_is_rejected() {
  let result = parse(json!({
    "nodes": [ { "id": "A", "type": "action" } ],
    "edges": [ { "source": "A", "target": "A" } ]
  }));

  assert!(!result.valid);
  assert_eq!(result.errors, vec!["Self-loop detected on node: A"]);
  assert_eq!(result.entry_points, vec!["A"]);
  assert_eq!(result.exit_points, vec!["A"]);
  assert_eq!(result.execution_order, vec!["A"]);
  assert_eq!(result.dependencies_of("A"), Some(&BTreeSet::new()));
}

#[test]
fn test_error_and_always_edges_are_dependencies() {
  let result = parse(json!({
    "nodes": [
      { "id": "A", "type": "action" },
      { "id": "B", "type": "action" },
      { "id": "C", "type": "output" }
    ],
    "edges": [
      { "source": "A", "target": "C", "edgeType": "error" },
      { "source": "B", "target": "C", "edgeType": "always" }
    ]
  }));

  assert!(result.valid);
  assert_eq!(
    result.dependencies_of("C"),
    Some(&BTreeSet::from(["A".to_string(), "B".to_string()]))
  );
}

#[test]
fn test_unknown_edge_type_warns() {
  let result = parse(json!({
    "nodes": [
      { "id": "A", "type": "action" },
      { "id": "B", "type": "action" }
    ],
    "edges": [ { "id": "e1", "source": "A", "target": "B", "edgeType": "sometimes" } ]
  }));

  assert!(result.valid);
  assert_eq!(
    result.warnings,
    vec!["Edge e1 (A -> B) has unknown edge type: sometimes; treating as success"]
  );
}

#[test]
fn test_edge_classification() {
  let def = FlowDefinition::new(
    vec![
      FlowNode::new("A", "action"),
      FlowNode::new("B", "action"),
      FlowNode::new("C", "action"),
      FlowNode::new("D", "action"),
    ],
    vec![
      FlowEdge::new("A", "B").with_id("plain"),
      FlowEdge::new("A", "C").with_id("fail").with_type(EdgeType::Error),
      FlowEdge::new("A", "D").with_id("explicit").with_type(EdgeType::Success),
      FlowEdge::new("B", "D").with_id("other").with_type(EdgeType::Error),
    ],
  );

  let errors: Vec<_> = edges_by_type(&def, "A", EdgeType::Error)
    .iter()
    .filter_map(|e| e.id.clone())
    .collect();
  assert_eq!(errors, vec!["fail"]);

  let successes: Vec<_> = edges_by_type(&def, "A", EdgeType::Success)
    .iter()
    .filter_map(|e| e.id.clone())
    .collect();
  assert_eq!(successes, vec!["plain", "explicit"]);
}

#[test]
fn test_ready_nodes_expose_parallel_branches() {
  let result = parse(json!({
    "nodes": [
      { "id": "t", "type": "trigger" },
      { "id": "a", "type": "action" },
      { "id": "b", "type": "action" },
      { "id": "join", "type": "output" }
    ],
    "edges": [
      { "source": "t", "target": "a" },
      { "source": "t", "target": "b" },
      { "source": "a", "target": "join" },
      { "source": "b", "target": "join" }
    ]
  }));

  let completed = BTreeSet::from(["t".to_string()]);
  assert_eq!(result.ready_nodes(&completed), vec!["a", "b"]);
}

#[test]
fn test_convenience_functions() {
  let def = FlowDefinition::from_value(&json!({
    "nodes": [ { "id": "a", "type": "trigger" }, { "id": "b", "type": "output" } ],
    "edges": [ { "source": "a", "target": "b" } ]
  }));

  assert!(is_valid_dag(&def));
  assert_eq!(execution_order(&def), vec!["a", "b"]);
}

#[test]
fn test_nodes_without_id() {
  let result = parse(json!({
    "nodes": [ { "type": "action" }, { "id": "b", "type": "action" } ]
  }));

  assert!(!result.valid);
  assert_eq!(result.errors, vec!["Node at index 0 has no id"]);
  assert_eq!(result.execution_order, vec!["b"]);
}
