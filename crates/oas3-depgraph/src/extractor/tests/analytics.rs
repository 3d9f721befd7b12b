use http::Method;

use crate::extractor::{
  analytics::GraphAnalytics,
  model::{DependencyEdge, DependencyStrength, Operation, OperationDependencyGraph},
  tests::support::{make_operation, make_semantic_type},
};

fn edge(source: &str, target: &str, semantic_type: &str) -> DependencyEdge {
  DependencyEdge {
    source: source.to_string(),
    target: target.to_string(),
    semantic_type: semantic_type.to_string(),
    source_path: "key".to_string(),
    target_path: "path.key".to_string(),
    strength: DependencyStrength::Required,
    description: String::new(),
  }
}

fn graph_with(operations: Vec<Operation>, edges: Vec<DependencyEdge>) -> OperationDependencyGraph {
  let semantic_types = edges
    .iter()
    .map(|e| (e.semantic_type.clone(), make_semantic_type(&e.semantic_type, None)))
    .collect();

  OperationDependencyGraph {
    operations: operations.into_iter().map(|op| (op.id.clone(), op)).collect(),
    semantic_types,
    edges,
    type_library: None,
    root_analysis: None,
    contamination: None,
  }
}

fn three_stage_graph() -> OperationDependencyGraph {
  graph_with(
    vec![
      make_operation("createDeployment", Method::POST, "/deployments"),
      make_operation("createProcessInstance", Method::POST, "/process-instances"),
      make_operation("getProcessInstance", Method::GET, "/process-instances/{key}"),
    ],
    vec![
      edge("createDeployment", "createProcessInstance", "ProcessDefinitionKey"),
      edge("createProcessInstance", "getProcessInstance", "ProcessInstanceKey"),
    ],
  )
}

#[test]
fn test_entry_points_and_sinks() {
  let analytics = GraphAnalytics::compute(&three_stage_graph());

  assert_eq!(analytics.entry_points, ["createDeployment"]);
  assert_eq!(analytics.sinks, ["getProcessInstance"]);
}

#[test]
fn test_entry_points_never_appear_as_edge_targets() {
  let graph = three_stage_graph();
  let analytics = GraphAnalytics::compute(&graph);

  for entry in &analytics.entry_points {
    assert!(graph.edges.iter().all(|e| &e.target != entry));
  }
}

#[test]
fn test_isolated_operation_is_both_entry_point_and_sink() {
  let graph = graph_with(vec![make_operation("healthCheck", Method::GET, "/health")], vec![]);
  let analytics = GraphAnalytics::compute(&graph);

  assert_eq!(analytics.entry_points, ["healthCheck"]);
  assert_eq!(analytics.sinks, ["healthCheck"]);
}

#[test]
fn test_type_usage_sorted_by_count_then_name() {
  let graph = graph_with(
    vec![
      make_operation("a", Method::POST, "/a"),
      make_operation("b", Method::POST, "/b"),
      make_operation("c", Method::POST, "/c"),
    ],
    vec![
      edge("a", "b", "UserKey"),
      edge("a", "c", "UserKey"),
      edge("b", "c", "GroupKey"),
      edge("c", "a", "BatchKey"),
    ],
  );

  let analytics = GraphAnalytics::compute(&graph);
  assert_eq!(
    analytics.type_usage,
    [
      ("UserKey".to_string(), 2),
      ("BatchKey".to_string(), 1),
      ("GroupKey".to_string(), 1),
    ]
  );
}

#[test]
fn test_mutual_edges_form_a_cluster() {
  let graph = graph_with(
    vec![
      make_operation("createUser", Method::POST, "/users"),
      make_operation("searchUsers", Method::POST, "/users/search"),
      make_operation("getHealth", Method::GET, "/health"),
    ],
    vec![
      edge("createUser", "searchUsers", "UserKey"),
      edge("searchUsers", "createUser", "UserKey"),
    ],
  );

  let analytics = GraphAnalytics::compute(&graph);
  assert_eq!(analytics.clusters, [vec!["createUser".to_string(), "searchUsers".to_string()]]);
}

#[test]
fn test_one_directional_chain_has_no_clusters() {
  let analytics = GraphAnalytics::compute(&three_stage_graph());
  assert!(analytics.clusters.is_empty());
}
