use http::Method;
use indexmap::IndexMap;

use crate::extractor::{
  model::{DependencyEdge, DependencyStrength, Operation},
  roots,
  tests::support::make_operation,
};

fn keyed(operations: Vec<Operation>) -> IndexMap<String, Operation> {
  operations.into_iter().map(|op| (op.id.clone(), op)).collect()
}

fn edge(source: &str, target: &str) -> DependencyEdge {
  DependencyEdge {
    source: source.to_string(),
    target: target.to_string(),
    semantic_type: "ProcessInstanceKey".to_string(),
    source_path: "processInstanceKey".to_string(),
    target_path: "path.processInstanceKey".to_string(),
    strength: DependencyStrength::Required,
    description: String::new(),
  }
}

#[test]
fn test_deployment_and_setup_classification() {
  let operations = keyed(vec![
    make_operation("createDeployment", Method::POST, "/deployments"),
    make_operation("createUser", Method::POST, "/users"),
    make_operation("initCluster", Method::POST, "/cluster/initialization"),
    make_operation("getProcessInstance", Method::GET, "/process-instances/{key}"),
  ]);

  let analysis = roots::analyze(&operations, &[]);

  assert!(analysis.deployment_operations.contains(&"createDeployment".to_string()));
  // A create against a top-level collection bootstraps its resource family.
  assert!(analysis.deployment_operations.contains(&"createUser".to_string()));
  assert!(!analysis.deployment_operations.contains(&"getProcessInstance".to_string()));

  assert!(analysis.setup_operations.contains(&"createUser".to_string()));
  assert!(analysis.setup_operations.contains(&"initCluster".to_string()));
  assert!(!analysis.setup_operations.contains(&"createDeployment".to_string()));
}

#[test]
fn test_entry_points_recomputed_from_edges() {
  let operations = keyed(vec![
    make_operation("createProcessInstance", Method::POST, "/process-instances"),
    make_operation("getProcessInstance", Method::GET, "/process-instances/{key}"),
  ]);
  let edges = vec![edge("createProcessInstance", "getProcessInstance")];

  let analysis = roots::analyze(&operations, &edges);
  assert_eq!(analysis.entry_points, ["createProcessInstance"]);
}

#[test]
fn test_bootstrap_sequences_gated_on_present_operations() {
  let operations = keyed(vec![
    make_operation("createDeployment", Method::POST, "/deployments"),
    make_operation("createProcessInstance", Method::POST, "/process-instances"),
    make_operation("createTenant", Method::POST, "/tenants"),
  ]);

  let analysis = roots::analyze(&operations, &[]);
  let names: Vec<&str> = analysis.bootstrap_sequences.iter().map(|s| s.name.as_str()).collect();

  assert!(names.contains(&"resource-deployment"));
  assert!(names.contains(&"process-instance"));
  assert!(names.contains(&"tenant-bootstrap"));
  // searchProcessInstances and createUser are absent from the document.
  assert!(!names.contains(&"process-instance-search"));
  assert!(!names.contains(&"identity-bootstrap"));
}

#[test]
fn test_bootstrap_sequence_contents() {
  let operations = keyed(vec![
    make_operation("createDeployment", Method::POST, "/deployments"),
    make_operation("createProcessInstance", Method::POST, "/process-instances"),
    make_operation("searchProcessInstances", Method::POST, "/process-instances/search"),
  ]);

  let analysis = roots::analyze(&operations, &[]);
  let sequence = analysis
    .bootstrap_sequences
    .iter()
    .find(|s| s.name == "process-instance-search")
    .expect("sequence missing");

  assert_eq!(
    sequence.operations,
    ["createDeployment", "createProcessInstance", "searchProcessInstances"]
  );
  assert_eq!(sequence.produces, ["ProcessInstanceKey"]);
}

#[test]
fn test_empty_document_yields_empty_analysis() {
  let analysis = roots::analyze(&IndexMap::new(), &[]);

  assert!(analysis.deployment_operations.is_empty());
  assert!(analysis.setup_operations.is_empty());
  assert!(analysis.entry_points.is_empty());
  assert!(analysis.bootstrap_sequences.is_empty());
}
