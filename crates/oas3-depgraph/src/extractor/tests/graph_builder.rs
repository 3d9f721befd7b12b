use http::Method;
use indexmap::IndexMap;

use crate::extractor::{
  graph_builder::build_edges,
  model::{DependencyStrength, Operation, OperationParameter, ParameterLocation, PrimitiveType},
  tests::support::{make_operation, make_producer, make_type_ref},
};

fn keyed(operations: Vec<Operation>) -> IndexMap<String, Operation> {
  operations.into_iter().map(|op| (op.id.clone(), op)).collect()
}

fn typed_path_param(name: &str, semantic_type: &str) -> OperationParameter {
  OperationParameter {
    name: name.to_string(),
    location: ParameterLocation::Path,
    required: true,
    semantic_type: Some(semantic_type.to_string()),
    provider: false,
    schema_shape: Some(PrimitiveType::String),
    examples: vec![],
  }
}

#[test]
fn test_producer_consumer_pair_yields_one_required_edge() {
  let producer = make_producer(
    "createProcessInstance",
    Method::POST,
    "/process-instances",
    "ProcessInstanceKey",
    "processInstanceKey",
  );

  let mut consumer = make_operation("getProcessInstance", Method::GET, "/process-instances/{processInstanceKey}");
  consumer
    .parameters
    .push(typed_path_param("processInstanceKey", "ProcessInstanceKey"));

  let edges = build_edges(&keyed(vec![producer, consumer]));

  assert_eq!(edges.len(), 1);
  let edge = &edges[0];
  assert_eq!(edge.source, "createProcessInstance");
  assert_eq!(edge.target, "getProcessInstance");
  assert_eq!(edge.semantic_type, "ProcessInstanceKey");
  assert_eq!(edge.source_path, "processInstanceKey");
  assert_eq!(edge.target_path, "path.processInstanceKey");
  assert_eq!(edge.strength, DependencyStrength::Required);
}

#[test]
fn test_no_self_edges() {
  // Produces and consumes its own key; must not depend on itself.
  let mut operation = make_producer(
    "upsertUser",
    Method::POST,
    "/users",
    "UserKey",
    "userKey",
  );
  operation.request_refs.push(make_type_ref("UserKey", "userKey", false));

  let edges = build_edges(&keyed(vec![operation]));
  assert!(edges.is_empty());
}

#[test]
fn test_optional_query_parameter_edge_is_optional() {
  let producer = make_producer("createUser", Method::POST, "/users", "UserKey", "userKey");

  let mut consumer = make_operation("listDocuments", Method::GET, "/documents");
  consumer.parameters.push(OperationParameter {
    name: "ownerKey".to_string(),
    location: ParameterLocation::Query,
    required: false,
    semantic_type: Some("UserKey".to_string()),
    provider: false,
    schema_shape: Some(PrimitiveType::String),
    examples: vec![],
  });

  let edges = build_edges(&keyed(vec![producer, consumer]));

  assert_eq!(edges.len(), 1);
  assert_eq!(edges[0].strength, DependencyStrength::Optional);
  assert_eq!(edges[0].target_path, "query.ownerKey");
}

#[test]
fn test_eventually_consistent_producer_makes_edge_conditional() {
  let mut producer = make_producer(
    "startBatch",
    Method::POST,
    "/batches",
    "BatchKey",
    "batchKey",
  );
  producer.eventually_consistent = true;

  let mut consumer = make_operation("searchBatches", Method::POST, "/batches/search");
  consumer.request_refs.push(make_type_ref("BatchKey", "filter.batchKey", false));

  let edges = build_edges(&keyed(vec![producer, consumer]));

  assert_eq!(edges.len(), 1);
  assert_eq!(edges[0].strength, DependencyStrength::Conditional);
}

#[test]
fn test_required_consumption_beats_eventual_consistency() {
  let mut producer = make_producer(
    "startBatch",
    Method::POST,
    "/batches",
    "BatchKey",
    "batchKey",
  );
  producer.eventually_consistent = true;

  let mut consumer = make_operation("cancelBatch", Method::POST, "/batches/cancellation");
  consumer.request_refs.push(make_type_ref("BatchKey", "batchKey", true));

  let edges = build_edges(&keyed(vec![producer, consumer]));

  assert_eq!(edges.len(), 1);
  assert_eq!(edges[0].strength, DependencyStrength::Required);
}

#[test]
fn test_top_level_body_field_strength_follows_required_flag() {
  let producer = make_producer("createUser", Method::POST, "/users", "UserKey", "userKey");

  let mut required_consumer = make_operation("assignOwner", Method::POST, "/ownership");
  required_consumer.request_refs.push(make_type_ref("UserKey", "userKey", true));

  let mut optional_consumer = make_operation("annotate", Method::POST, "/annotations");
  optional_consumer.request_refs.push(make_type_ref("UserKey", "userKey", false));

  let mut nested_consumer = make_operation("searchAudit", Method::POST, "/audit/search");
  nested_consumer
    .request_refs
    .push(make_type_ref("UserKey", "filter.userKey", false));

  let edges = build_edges(&keyed(vec![
    producer,
    required_consumer,
    optional_consumer,
    nested_consumer,
  ]));

  let strength_of = |target: &str| {
    edges
      .iter()
      .find(|e| e.target == target)
      .map(|e| e.strength)
      .expect("edge missing")
  };

  assert_eq!(strength_of("assignOwner"), DependencyStrength::Required);
  assert_eq!(strength_of("annotate"), DependencyStrength::Optional);
  assert_eq!(strength_of("searchAudit"), DependencyStrength::Optional);
}

#[test]
fn test_duplicate_productions_across_statuses_deduplicate() {
  let mut producer = make_producer(
    "createProcessInstance",
    Method::POST,
    "/process-instances",
    "ProcessInstanceKey",
    "processInstanceKey",
  );
  // A 201 surfacing the same reference must not double the edges.
  producer.response_refs.insert(
    "201".to_string(),
    vec![make_type_ref("ProcessInstanceKey", "processInstanceKey", false)],
  );

  let mut consumer = make_operation("getProcessInstance", Method::GET, "/process-instances/{processInstanceKey}");
  consumer
    .parameters
    .push(typed_path_param("processInstanceKey", "ProcessInstanceKey"));

  let edges = build_edges(&keyed(vec![producer, consumer]));
  assert_eq!(edges.len(), 1);
}

#[test]
fn test_error_responses_never_produce() {
  let mut producer = make_operation("createUser", Method::POST, "/users");
  producer
    .response_refs
    .insert("400".to_string(), vec![make_type_ref("UserKey", "userKey", false)]);

  let mut consumer = make_operation("getUser", Method::GET, "/users/{userKey}");
  consumer.parameters.push(typed_path_param("userKey", "UserKey"));

  let edges = build_edges(&keyed(vec![producer, consumer]));
  assert!(edges.is_empty());
}

#[test]
fn test_edge_description_names_both_sides() {
  let producer = make_producer("createUser", Method::POST, "/users", "UserKey", "userKey");
  let mut consumer = make_operation("getUser", Method::GET, "/users/{userKey}");
  consumer.parameters.push(typed_path_param("userKey", "UserKey"));

  let edges = build_edges(&keyed(vec![producer, consumer]));

  assert_eq!(edges.len(), 1);
  assert!(edges[0].description.contains("createUser"));
  assert!(edges[0].description.contains("getUser"));
  assert!(edges[0].description.contains("UserKey"));
}
