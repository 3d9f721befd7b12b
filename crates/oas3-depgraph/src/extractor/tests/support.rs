use std::collections::BTreeMap;

use http::Method;
use indexmap::IndexMap;
use oas3::{
  Spec,
  spec::{ObjectOrReference, ObjectSchema, SchemaType, SchemaTypeSet},
};
use serde_json::json;

use crate::extractor::{
  model::{Operation, PrimitiveType, SemanticType, SemanticTypeRef},
  operations::classify_operation,
};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

pub(super) fn parse_spec(spec_json: &str) -> Spec {
  oas3::from_json(spec_json).expect("failed to parse test spec")
}

pub(super) fn empty_spec() -> Spec {
  parse_spec(
    r#"{
      "openapi": "3.1.0",
      "info": { "title": "Test API", "version": "1.0.0" },
      "paths": {}
    }"#,
  )
}

pub(super) fn make_schema_ref(name: &str) -> ObjectOrReference<ObjectSchema> {
  ObjectOrReference::Ref {
    ref_path: format!("{SCHEMA_REF_PREFIX}{name}"),
    summary: None,
    description: None,
  }
}

pub(super) fn string_schema() -> ObjectSchema {
  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Single(SchemaType::String)),
    ..Default::default()
  }
}

pub(super) fn annotated_string_schema(type_name: &str, pattern: Option<&str>) -> ObjectSchema {
  let mut extensions = BTreeMap::new();
  extensions.insert("semantic-type".to_string(), json!(type_name));

  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Single(SchemaType::String)),
    pattern: pattern.map(String::from),
    extensions,
    ..Default::default()
  }
}

pub(super) fn make_semantic_type(name: &str, pattern: Option<&str>) -> SemanticType {
  SemanticType {
    name: name.to_string(),
    description: None,
    base_type: PrimitiveType::String,
    format: None,
    pattern: pattern.map(String::from),
    min_length: None,
    max_length: None,
  }
}

pub(super) fn make_type_ref(semantic_type: &str, field_path: &str, required: bool) -> SemanticTypeRef {
  SemanticTypeRef {
    semantic_type: semantic_type.to_string(),
    field_path: field_path.to_string(),
    required,
    schema_shape: PrimitiveType::String,
    constraints: vec![],
    examples: vec![],
    provider: false,
  }
}

pub(super) fn make_operation(id: &str, method: Method, path: &str) -> Operation {
  let classification = classify_operation(&method, path, id);
  let idempotent = matches!(
    method,
    Method::GET | Method::PUT | Method::DELETE | Method::HEAD | Method::OPTIONS
  );
  let cacheable = matches!(method, Method::GET | Method::HEAD);

  Operation {
    id: id.to_string(),
    method,
    path: path.to_string(),
    summary: None,
    description: None,
    tags: vec![],
    parameters: vec![],
    request_refs: vec![],
    response_refs: IndexMap::new(),
    classification,
    idempotent,
    cacheable,
    eventually_consistent: false,
    kind_info: None,
    conditional_idempotency: None,
  }
}

/// Producer of `type_name` at `field` in its 200 response.
pub(super) fn make_producer(id: &str, method: Method, path: &str, type_name: &str, field: &str) -> Operation {
  let mut operation = make_operation(id, method, path);
  operation
    .response_refs
    .insert("200".to_string(), vec![make_type_ref(type_name, field, false)]);
  operation
}
