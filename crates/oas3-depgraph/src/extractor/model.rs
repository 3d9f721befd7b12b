use http::Method;
use indexmap::IndexMap;
use oas3::spec::{ObjectSchema, ParameterIn, SchemaType, SchemaTypeSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

/// Serializes [`http::Method`] as its canonical uppercase string.
mod method_serde {
  use http::Method;
  use serde::{Deserialize as _, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse::<Method>().map_err(D::Error::custom)
  }
}

/// Primitive wire shape underlying a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
  #[default]
  String,
  Integer,
  Number,
  Boolean,
  Array,
  Object,
  Null,
}

impl From<SchemaType> for PrimitiveType {
  fn from(value: SchemaType) -> Self {
    match value {
      SchemaType::String => Self::String,
      SchemaType::Integer => Self::Integer,
      SchemaType::Number => Self::Number,
      SchemaType::Boolean => Self::Boolean,
      SchemaType::Array => Self::Array,
      SchemaType::Object => Self::Object,
      SchemaType::Null => Self::Null,
    }
  }
}

impl PrimitiveType {
  /// Derives the primitive shape of a schema, ignoring a `null` wrapper in a
  /// two-member type set. Untyped schemas default to `string`.
  pub fn of_schema(schema: &ObjectSchema) -> Self {
    match &schema.schema_type {
      Some(SchemaTypeSet::Single(t)) => (*t).into(),
      Some(SchemaTypeSet::Multiple(types)) => types
        .iter()
        .find(|t| **t != SchemaType::Null)
        .copied()
        .map_or(Self::Null, Into::into),
      None => Self::String,
    }
  }
}

/// A named logical type layered over a primitive schema type.
///
/// Two discoveries with the same name are the same entity; the first
/// discovery wins and later ones may only fill missing constraint fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticType {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub base_type: PrimitiveType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pattern: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_length: Option<u64>,
}

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Path,
  Query,
  Header,
  Cookie,
}

impl From<ParameterIn> for ParameterLocation {
  fn from(value: ParameterIn) -> Self {
    match value {
      ParameterIn::Path => Self::Path,
      ParameterIn::Query => Self::Query,
      ParameterIn::Header => Self::Header,
      ParameterIn::Cookie => Self::Cookie,
    }
  }
}

/// One declared parameter of an operation.
///
/// Path parameters are always required regardless of what the document says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
  pub name: String,
  pub location: ParameterLocation,
  pub required: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub semantic_type: Option<String>,
  #[serde(default)]
  pub provider: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schema_shape: Option<PrimitiveType>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub examples: Vec<Value>,
}

/// A single occurrence of a semantic type at a field path inside a request
/// or response body.
///
/// Field paths use dot/bracket notation: `parent.child` for object
/// properties and `parent[]` for array items. The empty path is the body
/// root itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticTypeRef {
  pub semantic_type: String,
  pub field_path: String,
  pub required: bool,
  pub schema_shape: PrimitiveType,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub constraints: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub examples: Vec<Value>,
  #[serde(default)]
  pub provider: bool,
}

/// Coarse behavioral classification of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperationClass {
  Create,
  Read,
  Update,
  Delete,
  Search,
  Action,
  Deploy,
  Setup,
}

/// Vendor-declared operation kind and duplicate-handling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationKindInfo {
  pub kind: String,
  pub duplicate_policy: String,
}

/// Vendor-declared conditional idempotency window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalIdempotency {
  pub key_fields: Vec<String>,
  pub time_window_field: String,
  pub time_window_unit: String,
  pub duplicate_policy: String,
  pub condition: String,
}

/// One API endpoint+method pair, fully extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
  pub id: String,
  #[serde(with = "method_serde")]
  pub method: Method,
  pub path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub parameters: Vec<OperationParameter>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub request_refs: Vec<SemanticTypeRef>,
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub response_refs: IndexMap<String, Vec<SemanticTypeRef>>,
  pub classification: OperationClass,
  pub idempotent: bool,
  pub cacheable: bool,
  #[serde(default)]
  pub eventually_consistent: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind_info: Option<OperationKindInfo>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub conditional_idempotency: Option<ConditionalIdempotency>,
}

impl Operation {
  /// Semantic references this operation produces: response-body references
  /// under success or redirect status codes. Error responses never produce.
  pub fn produced_refs(&self) -> impl Iterator<Item = &SemanticTypeRef> {
    self
      .response_refs
      .iter()
      .filter(|(status, _)| status.starts_with('2') || status.starts_with('3'))
      .flat_map(|(_, refs)| refs)
  }
}

/// How strongly a consumer depends on its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyStrength {
  Required,
  Optional,
  Conditional,
}

/// Directed edge: `source` produces a semantic type that `target` consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
  pub source: String,
  pub target: String,
  pub semantic_type: String,
  pub source_path: String,
  pub target_path: String,
  pub strength: DependencyStrength,
  pub description: String,
}

/// Why a synthesized example value is invalid for its semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvalidationKind {
  WrongType,
  PatternViolation,
  TooShort,
  TooLong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidExample {
  pub value: Value,
  pub kind: InvalidationKind,
}

/// Strategy for synthesizing fresh values of a semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum GenerationRule {
  Pattern { pattern: String },
  Random,
}

/// Library entry for one semantic type: example corpus plus peers that share
/// its structural shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticTypeDefinition {
  #[serde(flatten)]
  pub info: SemanticType,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub valid_examples: Vec<Value>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub invalid_examples: Vec<InvalidExample>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub contamination_candidates: Vec<String>,
  pub generation: GenerationRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SemanticTypeLibrary {
  pub types: IndexMap<String, SemanticTypeDefinition>,
}

/// How dangerous it would be to confuse a semantic type with its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContaminationSeverity {
  High,
  Medium,
  Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedOutcome {
  Reject,
}

/// A substitution scenario: feeding `value` (a valid example of
/// `candidate_type`) where `target_type` is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationScenario {
  pub target_type: String,
  pub candidate_type: String,
  pub value: Value,
  pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationEntry {
  pub candidates: Vec<String>,
  pub severity: ContaminationSeverity,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub scenarios: Vec<ContaminationScenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CrossContaminationMap {
  pub entries: IndexMap<String, ContaminationEntry>,
}

/// A named, ordered list of operations that must run to make dependent
/// operations callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSequence {
  pub name: String,
  pub description: String,
  pub operations: Vec<String>,
  pub produces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RootOperationAnalysis {
  pub deployment_operations: Vec<String>,
  pub setup_operations: Vec<String>,
  pub entry_points: Vec<String>,
  pub bootstrap_sequences: Vec<BootstrapSequence>,
}

/// Aggregate root of an extraction run.
///
/// Invariant: every edge's source/target ids and semantic type name exist in
/// the two maps. [`Self::validate`] checks this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationDependencyGraph {
  pub operations: IndexMap<String, Operation>,
  pub semantic_types: IndexMap<String, SemanticType>,
  pub edges: Vec<DependencyEdge>,
  pub type_library: Option<SemanticTypeLibrary>,
  pub root_analysis: Option<RootOperationAnalysis>,
  pub contamination: Option<CrossContaminationMap>,
}

impl OperationDependencyGraph {
  /// Checks the edge referential invariant.
  pub fn validate(&self) -> anyhow::Result<()> {
    for edge in &self.edges {
      if !self.operations.contains_key(&edge.source) {
        anyhow::bail!("edge references unknown source operation '{}'", edge.source);
      }
      if !self.operations.contains_key(&edge.target) {
        anyhow::bail!("edge references unknown target operation '{}'", edge.target);
      }
      if !self.semantic_types.contains_key(&edge.semantic_type) {
        anyhow::bail!("edge references unknown semantic type '{}'", edge.semantic_type);
      }
      if edge.source == edge.target {
        anyhow::bail!("self-dependency on operation '{}'", edge.source);
      }
    }
    Ok(())
  }
}
