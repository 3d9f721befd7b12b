use http::Method;
use indexmap::IndexMap;
use oas3::{
  Spec,
  spec::{ObjectOrReference, ObjectSchema, Operation as SpecOperation, Parameter},
};
use serde_json::Value;

use crate::extractor::{
  metrics::{ExtractionStats, ExtractionWarning},
  model::{
    ConditionalIdempotency, Operation, OperationClass, OperationKindInfo, OperationParameter, ParameterLocation,
    PrimitiveType, SemanticTypeRef,
  },
  resolver::{SEMANTIC_PROVIDER_EXT, SchemaResolver, SemanticTypeRegistry, bool_extension},
};

/// Operation-level vendor extension: eventual consistency of the result.
const EVENTUALLY_CONSISTENT_EXT: &str = "eventually-consistent";
/// Operation-level vendor extension: operation kind and duplicate policy.
const OPERATION_KIND_EXT: &str = "operation-kind";
/// Operation-level vendor extension: conditional idempotency window.
const CONDITIONAL_IDEMPOTENCY_EXT: &str = "conditional-idempotency";

/// Path segments whose presence turns a POST from a create into a
/// state-transition action.
const TRANSITION_SEGMENTS: &[&str] = &[
  "activation",
  "cancellation",
  "completion",
  "resolution",
  "suspension",
  "termination",
  "deletion",
  "failure",
  "publication",
  "assignment",
];

/// Builds one canonical [`Operation`] record per path+method pair declared
/// in the specification.
///
/// Operations without an `operationId` are skipped with a warning, never an
/// error; a document without a `paths` collection yields zero operations.
pub struct OperationExtractor<'a> {
  spec: &'a Spec,
  resolver: &'a SchemaResolver<'a>,
}

impl<'a> OperationExtractor<'a> {
  pub fn new(spec: &'a Spec, resolver: &'a SchemaResolver<'a>) -> Self {
    Self { spec, resolver }
  }

  pub fn extract_all(
    &self,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> IndexMap<String, Operation> {
    let mut operations = IndexMap::new();

    for (path, method, operation) in self.spec.operations() {
      let Some(id) = operation.operation_id.clone() else {
        stats.record_skipped_operation(ExtractionWarning::MissingOperationId {
          method: method.to_string(),
          path: path.clone(),
        });
        continue;
      };

      let extracted = self.extract_one(&id, &method, &path, &operation, registry, stats);
      stats.record_operation();
      operations.insert(id, extracted);
    }

    operations
  }

  fn extract_one(
    &self,
    id: &str,
    method: &Method,
    path: &str,
    operation: &SpecOperation,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> Operation {
    let parameters = self.extract_parameters(path, operation, registry, stats);
    let request_refs = self.extract_request_refs(id, operation, registry, stats);
    let response_refs = self.extract_response_refs(id, operation, registry, stats);

    Operation {
      id: id.to_string(),
      method: method.clone(),
      path: path.to_string(),
      summary: operation.summary.clone(),
      description: operation.description.clone(),
      tags: operation.tags.clone(),
      parameters,
      request_refs,
      response_refs,
      classification: classify_operation(method, path, id),
      idempotent: is_idempotent_method(method),
      cacheable: is_cacheable_method(method),
      eventually_consistent: operation_bool_extension(operation, EVENTUALLY_CONSISTENT_EXT),
      kind_info: parse_extension_block::<OperationKindInfo>(operation, OPERATION_KIND_EXT),
      conditional_idempotency: parse_extension_block::<ConditionalIdempotency>(operation, CONDITIONAL_IDEMPOTENCY_EXT),
    }
  }

  /// Path-item parameters first, then operation parameters, with the
  /// operation level overriding on (location, name) collisions.
  fn collect_parameters(&self, path: &str, operation: &SpecOperation) -> Vec<Parameter> {
    let mut params = vec![];

    if let Some(path_item) = self.spec.paths.as_ref().and_then(|p| p.get(path)) {
      params.extend(path_item.parameters.iter().filter_map(|r| r.resolve(self.spec).ok()));
    }

    for param in operation.parameters.iter().filter_map(|r| r.resolve(self.spec).ok()) {
      params.retain(|p| p.location != param.location || p.name != param.name);
      params.push(param);
    }

    params
  }

  fn extract_parameters(
    &self,
    path: &str,
    operation: &SpecOperation,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> Vec<OperationParameter> {
    self
      .collect_parameters(path, operation)
      .into_iter()
      .map(|param| self.convert_parameter(&param, registry, stats))
      .collect()
  }

  fn convert_parameter(
    &self,
    param: &Parameter,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> OperationParameter {
    let location = ParameterLocation::from(param.location);
    // Path parameters are structurally mandatory, whatever the document says.
    let required = location == ParameterLocation::Path || param.required.unwrap_or(false);

    let resolved_schema = param
      .schema
      .as_ref()
      .and_then(|schema_ref| schema_ref.resolve(self.spec).ok());

    let semantic_type = param
      .schema
      .as_ref()
      .and_then(|schema_ref| self.resolver.find_semantic_type(schema_ref));
    if let (Some(name), Some(schema)) = (&semantic_type, &resolved_schema) {
      registry.register(name, schema, stats);
    }

    let provider = resolved_schema
      .as_ref()
      .is_some_and(|schema| bool_extension(schema, SEMANTIC_PROVIDER_EXT));

    let examples = param
      .example
      .clone()
      .or_else(|| resolved_schema.as_ref().and_then(|s| s.example.clone()))
      .into_iter()
      .collect();

    OperationParameter {
      name: param.name.clone(),
      location,
      required,
      semantic_type,
      provider,
      schema_shape: resolved_schema.as_ref().map(PrimitiveType::of_schema),
      examples,
    }
  }

  fn extract_request_refs(
    &self,
    operation_id: &str,
    operation: &SpecOperation,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> Vec<SemanticTypeRef> {
    let Some(body_ref) = &operation.request_body else {
      return vec![];
    };
    let Ok(body) = body_ref.resolve(self.spec) else {
      stats.record_warning(ExtractionWarning::UnresolvedReference {
        context: format!("request body of '{operation_id}'"),
      });
      return vec![];
    };

    let roots: Vec<&ObjectOrReference<ObjectSchema>> =
      body.content.values().filter_map(|media| media.schema.as_ref()).collect();

    self
      .resolver
      .collect_refs(&roots, body.required.unwrap_or(false), registry, stats)
  }

  fn extract_response_refs(
    &self,
    operation_id: &str,
    operation: &SpecOperation,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> IndexMap<String, Vec<SemanticTypeRef>> {
    let Some(responses) = &operation.responses else {
      return IndexMap::new();
    };

    let mut refs_by_status = IndexMap::new();
    for (status, response_ref) in responses {
      let Ok(response) = response_ref.resolve(self.spec) else {
        stats.record_warning(ExtractionWarning::UnresolvedReference {
          context: format!("response {status} of '{operation_id}'"),
        });
        continue;
      };

      if response.content.is_empty() {
        stats.record_warning(ExtractionWarning::MissingResponseContent {
          operation_id: operation_id.to_string(),
          status: status.clone(),
        });
        continue;
      }

      let roots: Vec<&ObjectOrReference<ObjectSchema>> = response
        .content
        .values()
        .filter_map(|media| media.schema.as_ref())
        .collect();

      let refs = self.resolver.collect_refs(&roots, false, registry, stats);
      if !refs.is_empty() {
        refs_by_status.insert(status.clone(), refs);
      }
    }

    refs_by_status
  }
}

/// Classification precedence: explicit deploy pattern, then explicit search
/// pattern, then the generic method table.
pub(crate) fn classify_operation(method: &Method, path: &str, operation_id: &str) -> OperationClass {
  if *method == Method::POST && has_deployment_segment(path) {
    return OperationClass::Deploy;
  }

  let id_lower = operation_id.to_lowercase();
  if id_lower.contains("search") || path.to_lowercase().contains("search") {
    return OperationClass::Search;
  }

  match *method {
    Method::POST => {
      if is_transition_path(path) {
        OperationClass::Action
      } else {
        OperationClass::Create
      }
    }
    Method::GET => OperationClass::Read,
    Method::PUT | Method::PATCH => OperationClass::Update,
    Method::DELETE => OperationClass::Delete,
    _ => OperationClass::Action,
  }
}

fn has_deployment_segment(path: &str) -> bool {
  path.split('/').any(|segment| segment.contains("deploy"))
}

fn is_transition_path(path: &str) -> bool {
  path
    .split('/')
    .next_back()
    .is_some_and(|last| TRANSITION_SEGMENTS.contains(&last))
}

fn is_idempotent_method(method: &Method) -> bool {
  matches!(
    *method,
    Method::GET | Method::PUT | Method::DELETE | Method::HEAD | Method::OPTIONS
  )
}

fn is_cacheable_method(method: &Method) -> bool {
  matches!(*method, Method::GET | Method::HEAD)
}

fn operation_extension<'a>(operation: &'a SpecOperation, name: &str) -> Option<&'a Value> {
  operation
    .extensions
    .get(name)
    .or_else(|| operation.extensions.get(&format!("x-{name}")))
}

fn operation_bool_extension(operation: &SpecOperation, name: &str) -> bool {
  operation_extension(operation, name)
    .and_then(Value::as_bool)
    .unwrap_or(false)
}

/// Parses a vendor extension block verbatim. Malformed or partially
/// specified blocks are dropped silently rather than failing extraction.
fn parse_extension_block<T: serde::de::DeserializeOwned>(operation: &SpecOperation, name: &str) -> Option<T> {
  operation_extension(operation, name)
    .cloned()
    .and_then(|value| serde_json::from_value(value).ok())
}
