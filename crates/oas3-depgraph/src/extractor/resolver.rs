use indexmap::IndexMap;
use oas3::{
  Spec,
  spec::{ObjectOrReference, ObjectSchema, Schema},
};
use serde_json::Value;

use crate::extractor::{
  metrics::{ExtractionStats, ExtractionWarning},
  model::{PrimitiveType, SemanticType, SemanticTypeRef},
};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Vendor extension carrying the semantic type name of a schema node.
pub const SEMANTIC_TYPE_EXT: &str = "semantic-type";
/// Vendor extension marking a node as the authoritative source of its
/// semantic type's value.
pub const SEMANTIC_PROVIDER_EXT: &str = "semantic-provider";

/// Guard against pathological `allOf` nesting during first-match search.
const MAX_COMPOSITION_DEPTH: usize = 32;

pub(crate) fn parse_ref(ref_path: &str) -> Option<&str> {
  ref_path.strip_prefix(SCHEMA_REF_PREFIX)
}

pub(crate) fn schema_ref_name(node: &ObjectOrReference<ObjectSchema>) -> Option<&str> {
  match node {
    ObjectOrReference::Ref { ref_path, .. } => parse_ref(ref_path),
    ObjectOrReference::Object(_) => None,
  }
}

/// Looks up a vendor extension, tolerating both trimmed and `x-` prefixed
/// keys since loaders differ on whether the prefix is stripped.
fn extension<'a>(extensions: &'a std::collections::BTreeMap<String, Value>, name: &str) -> Option<&'a Value> {
  extensions.get(name).or_else(|| extensions.get(&format!("x-{name}")))
}

pub(crate) fn string_extension(schema: &ObjectSchema, name: &str) -> Option<String> {
  extension(&schema.extensions, name)
    .and_then(Value::as_str)
    .map(String::from)
}

pub(crate) fn bool_extension(schema: &ObjectSchema, name: &str) -> bool {
  extension(&schema.extensions, name).and_then(Value::as_bool).unwrap_or(false)
}

/// Decides whether an unannotated referenced schema should still be treated
/// as a semantic type.
///
/// Isolated behind a trait so the naming-convention heuristic can be swapped
/// for a stricter mechanism (an explicit marker, say) without touching the
/// resolver's callers.
pub trait SemanticTypeInference {
  fn infer(&self, ref_name: &str, schema: &ObjectSchema) -> Option<String>;
}

/// Default heuristic: a capitalized reference name with the identifier
/// suffix `Key`, under a direct provider marker, names its own semantic type.
/// Pattern matching over a naming convention, not a structural guarantee.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixInference;

impl SemanticTypeInference for SuffixInference {
  fn infer(&self, ref_name: &str, schema: &ObjectSchema) -> Option<String> {
    let capitalized = ref_name.chars().next().is_some_and(char::is_uppercase);
    if capitalized && ref_name.ends_with("Key") && bool_extension(schema, SEMANTIC_PROVIDER_EXT) {
      Some(ref_name.to_string())
    } else {
      None
    }
  }
}

/// Registry of every semantic type discovered so far, keyed by name.
///
/// First discovery creates the entry; later discoveries may only fill
/// missing constraint fields and conflicting re-declarations are reported
/// as warnings with the first value kept.
#[derive(Debug, Default)]
pub struct SemanticTypeRegistry {
  types: IndexMap<String, SemanticType>,
}

impl SemanticTypeRegistry {
  pub fn register(&mut self, name: &str, schema: &ObjectSchema, stats: &mut ExtractionStats) {
    let discovered = SemanticType {
      name: name.to_string(),
      description: schema.description.clone(),
      base_type: PrimitiveType::of_schema(schema),
      format: schema.format.clone(),
      pattern: schema.pattern.clone(),
      min_length: schema.min_length,
      max_length: schema.max_length,
    };

    match self.types.get_mut(name) {
      None => {
        self.types.insert(name.to_string(), discovered);
        stats.record_semantic_type();
      }
      Some(existing) => {
        merge_field(name, "format", &mut existing.format, discovered.format, stats);
        merge_field(name, "pattern", &mut existing.pattern, discovered.pattern, stats);
        merge_field(name, "minLength", &mut existing.min_length, discovered.min_length, stats);
        merge_field(name, "maxLength", &mut existing.max_length, discovered.max_length, stats);
        if existing.description.is_none() {
          existing.description = discovered.description;
        }
      }
    }
  }

  pub fn get(&self, name: &str) -> Option<&SemanticType> {
    self.types.get(name)
  }

  pub fn into_types(self) -> IndexMap<String, SemanticType> {
    self.types
  }
}

fn merge_field<T: PartialEq + std::fmt::Debug>(
  type_name: &str,
  field: &str,
  existing: &mut Option<T>,
  discovered: Option<T>,
  stats: &mut ExtractionStats,
) {
  if existing.is_none() {
    *existing = discovered;
    return;
  }
  if let (Some(current), Some(value)) = (existing.as_ref(), discovered.as_ref())
    && current != value
  {
    stats.record_warning(ExtractionWarning::ConflictingSemanticType {
      name: type_name.to_string(),
      field: field.to_string(),
    });
  }
}

/// Accumulates discovered references, deduplicated per
/// `(semantic type, field path)`. Provider flags are OR-ed on rediscovery,
/// so a union branch can never clear a flag another branch set.
#[derive(Debug, Default)]
struct RefAccumulator {
  refs: IndexMap<(String, String), SemanticTypeRef>,
}

impl RefAccumulator {
  fn insert(&mut self, reference: SemanticTypeRef) {
    let key = (reference.semantic_type.clone(), reference.field_path.clone());
    match self.refs.get_mut(&key) {
      None => {
        self.refs.insert(key, reference);
      }
      Some(existing) => existing.provider |= reference.provider,
    }
  }

  fn mark_provider_at(&mut self, path: &str) {
    for reference in self.refs.values_mut() {
      if reference.field_path == path {
        reference.provider = true;
      }
    }
  }

  fn into_refs(self) -> Vec<SemanticTypeRef> {
    self.refs.into_values().collect()
  }
}

/// Resolves schema references and discovers semantic type annotations inside
/// arbitrarily nested compositions.
///
/// Pure over its inputs: discovered types land in the caller's registry,
/// defects in the caller's stats. Unresolvable references yield nothing and
/// never fail.
pub struct SchemaResolver<'a> {
  spec: &'a Spec,
  inference: &'a dyn SemanticTypeInference,
}

impl<'a> SchemaResolver<'a> {
  pub fn new(spec: &'a Spec, inference: &'a dyn SemanticTypeInference) -> Self {
    Self { spec, inference }
  }

  /// First-match annotation search: the node itself, then each `allOf`
  /// member depth-first. Short-circuits on the first hit.
  pub fn find_semantic_type(&self, node: &ObjectOrReference<ObjectSchema>) -> Option<String> {
    self.find_semantic_type_at(node, 0)
  }

  fn find_semantic_type_at(&self, node: &ObjectOrReference<ObjectSchema>, depth: usize) -> Option<String> {
    if depth > MAX_COMPOSITION_DEPTH {
      return None;
    }
    let schema = node.resolve(self.spec).ok()?;

    if let Some(name) = string_extension(&schema, SEMANTIC_TYPE_EXT) {
      return Some(name);
    }

    schema
      .all_of
      .iter()
      .find_map(|member| self.find_semantic_type_at(member, depth + 1))
  }

  /// Full traversal: collects every semantic type reference reachable from
  /// the given roots, all rooted at the empty field path. Multiple roots
  /// (one per media type) share a single accumulator so rediscoveries
  /// deduplicate across them.
  pub fn collect_refs(
    &self,
    roots: &[&ObjectOrReference<ObjectSchema>],
    root_required: bool,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) -> Vec<SemanticTypeRef> {
    let mut acc = RefAccumulator::default();
    let mut visiting = Vec::new();
    for root in roots {
      self.walk(root, "", root_required, &mut acc, &mut visiting, registry, stats);
    }
    acc.into_refs()
  }

  #[allow(clippy::too_many_arguments)]
  fn walk(
    &self,
    node: &ObjectOrReference<ObjectSchema>,
    path: &str,
    required: bool,
    acc: &mut RefAccumulator,
    visiting: &mut Vec<String>,
    registry: &mut SemanticTypeRegistry,
    stats: &mut ExtractionStats,
  ) {
    let ref_name = schema_ref_name(node).map(String::from);
    if let Some(name) = &ref_name
      && visiting.contains(name)
    {
      return;
    }

    let Ok(schema) = node.resolve(self.spec) else {
      stats.record_warning(ExtractionWarning::UnresolvedReference {
        context: format!("schema at '{}'", if path.is_empty() { "<root>" } else { path }),
      });
      return;
    };

    if let Some(name) = ref_name.clone() {
      visiting.push(name);
    }

    let provider_here = bool_extension(&schema, SEMANTIC_PROVIDER_EXT);

    if let Some(type_name) = string_extension(&schema, SEMANTIC_TYPE_EXT) {
      registry.register(&type_name, &schema, stats);
      acc.insert(make_ref(&type_name, path, required, provider_here, &schema));
    } else if let Some(name) = ref_name.as_deref()
      && let Some(inferred) = self.inference.infer(name, &schema)
    {
      registry.register(&inferred, &schema, stats);
      acc.insert(make_ref(&inferred, path, required, true, &schema));
    }

    // allOf members contribute at the composite's own path; a provider
    // marker on the composite asserts the union has exactly one
    // authoritative member, so it lifts onto everything collected here.
    for member in &schema.all_of {
      self.walk(member, path, required, acc, visiting, registry, stats);
    }
    if provider_here {
      acc.mark_provider_at(path);
    }

    // oneOf/anyOf are alternative shapes of the same field, not new fields.
    for branch in schema.one_of.iter().chain(&schema.any_of) {
      self.walk(branch, path, required, acc, visiting, registry, stats);
    }

    for (prop_name, prop) in &schema.properties {
      let child_path = if path.is_empty() {
        prop_name.clone()
      } else {
        format!("{path}.{prop_name}")
      };
      let child_required = schema.required.contains(prop_name);
      self.walk(prop, &child_path, child_required, acc, visiting, registry, stats);
    }

    if let Some(items) = &schema.items
      && let Schema::Object(items_ref) = items.as_ref()
    {
      let item_path = format!("{path}[]");
      self.walk(items_ref, &item_path, required, acc, visiting, registry, stats);
    }

    if ref_name.is_some() {
      visiting.pop();
    }
  }

}

fn make_ref(type_name: &str, path: &str, required: bool, provider: bool, schema: &ObjectSchema) -> SemanticTypeRef {
  SemanticTypeRef {
    semantic_type: type_name.to_string(),
    field_path: path.to_string(),
    required,
    schema_shape: PrimitiveType::of_schema(schema),
    constraints: schema_constraints(schema),
    examples: schema.example.iter().cloned().collect(),
    provider,
  }
}

fn schema_constraints(schema: &ObjectSchema) -> Vec<String> {
  let mut constraints = Vec::new();
  if let Some(format) = &schema.format {
    constraints.push(format!("format={format}"));
  }
  if let Some(pattern) = &schema.pattern {
    constraints.push(format!("pattern={pattern}"));
  }
  if let Some(min) = schema.min_length {
    constraints.push(format!("minLength={min}"));
  }
  if let Some(max) = schema.max_length {
    constraints.push(format!("maxLength={max}"));
  }
  constraints
}
