use indexmap::IndexMap;
use oas3::Spec;
use regex::Regex;
use serde_json::{Value, json};

use crate::extractor::{
  metrics::{ExtractionStats, ExtractionWarning},
  model::{
    GenerationRule, InvalidExample, InvalidationKind, PrimitiveType, SemanticType, SemanticTypeDefinition,
    SemanticTypeLibrary,
  },
  resolver::{SEMANTIC_TYPE_EXT, string_extension},
};

/// Candidate values for identifier-style patterns; each is kept only when it
/// actually satisfies the declared pattern. Includes a negative-sign value
/// and a large-magnitude value for numeric-string identifiers.
const PATTERN_CANDIDATES: &[&str] = &["1", "42", "1000", "2251799813685249", "-1", "-9007199254740991"];

/// Fallback values for identifier-named types with no usable pattern.
const IDENTIFIER_DEFAULTS: &[&str] = &["1", "2", "12345"];

/// A string guaranteed not to match any identifier-style pattern.
const PATTERN_VIOLATION: &str = "not!a@valid#value";

pub(crate) fn is_identifier_name(name: &str) -> bool {
  name.ends_with("Key") || name.ends_with("Id")
}

/// Builds the per-type example corpus: declared examples first, then
/// pattern-derived values, then generic defaults; invalid examples are
/// synthesized deterministically from the declared constraints.
pub struct TypeLibraryBuilder<'a> {
  spec: &'a Spec,
}

impl<'a> TypeLibraryBuilder<'a> {
  pub fn new(spec: &'a Spec) -> Self {
    Self { spec }
  }

  pub fn build(
    &self,
    semantic_types: &IndexMap<String, SemanticType>,
    stats: &mut ExtractionStats,
  ) -> SemanticTypeLibrary {
    let types = semantic_types
      .iter()
      .map(|(name, info)| {
        (
          name.clone(),
          self.build_definition(info, semantic_types, stats),
        )
      })
      .collect();

    SemanticTypeLibrary { types }
  }

  fn build_definition(
    &self,
    info: &SemanticType,
    all: &IndexMap<String, SemanticType>,
    stats: &mut ExtractionStats,
  ) -> SemanticTypeDefinition {
    let pattern = self.compile_pattern(info, stats);

    let mut valid_examples = self.declared_examples(&info.name);
    if valid_examples.is_empty()
      && let Some(regex) = &pattern
    {
      valid_examples = PATTERN_CANDIDATES
        .iter()
        .filter(|candidate| regex.is_match(candidate))
        .map(|candidate| json!(candidate))
        .collect();
    }
    if valid_examples.is_empty() {
      valid_examples = if is_identifier_name(&info.name) {
        IDENTIFIER_DEFAULTS.iter().map(|v| json!(v)).collect()
      } else {
        vec![json!("sample-value")]
      };
    }

    SemanticTypeDefinition {
      info: info.clone(),
      valid_examples,
      invalid_examples: invalid_examples(info, pattern.as_ref()),
      contamination_candidates: contamination_candidates(info, all),
      generation: match &info.pattern {
        Some(pattern) => GenerationRule::Pattern { pattern: pattern.clone() },
        None => GenerationRule::Random,
      },
    }
  }

  fn compile_pattern(&self, info: &SemanticType, stats: &mut ExtractionStats) -> Option<Regex> {
    let pattern = info.pattern.as_deref()?;
    match Regex::new(pattern) {
      Ok(regex) => Some(regex),
      Err(_) => {
        stats.record_warning(ExtractionWarning::InvalidPattern {
          name: info.name.clone(),
          pattern: pattern.to_string(),
        });
        None
      }
    }
  }

  /// Explicit example values declared on schema definitions that either
  /// carry the matching annotation or are the type's namesake schema.
  fn declared_examples(&self, type_name: &str) -> Vec<Value> {
    let Some(components) = &self.spec.components else {
      return vec![];
    };

    let mut examples = vec![];
    for (schema_name, schema_ref) in &components.schemas {
      let Ok(schema) = schema_ref.resolve(self.spec) else {
        continue;
      };
      let annotated = string_extension(&schema, SEMANTIC_TYPE_EXT).is_some_and(|name| name == type_name);
      if !annotated && schema_name != type_name {
        continue;
      }
      if let Some(example) = &schema.example
        && !examples.contains(example)
      {
        examples.push(example.clone());
      }
    }
    examples
  }
}

fn invalid_examples(info: &SemanticType, pattern: Option<&Regex>) -> Vec<InvalidExample> {
  let mut invalid = vec![];

  if info.base_type == PrimitiveType::String {
    for wrong in [json!(12345), json!(true), Value::Null] {
      invalid.push(InvalidExample {
        value: wrong,
        kind: InvalidationKind::WrongType,
      });
    }
  }

  if let Some(regex) = pattern
    && !regex.is_match(PATTERN_VIOLATION)
  {
    invalid.push(InvalidExample {
      value: json!(PATTERN_VIOLATION),
      kind: InvalidationKind::PatternViolation,
    });
  }

  if let Some(min) = info.min_length
    && min > 0
  {
    invalid.push(InvalidExample {
      value: json!("x".repeat((min - 1) as usize)),
      kind: InvalidationKind::TooShort,
    });
  }

  if let Some(max) = info.max_length {
    invalid.push(InvalidExample {
      value: json!("x".repeat((max + 1) as usize)),
      kind: InvalidationKind::TooLong,
    });
  }

  invalid
}

/// Peers sharing identical (base type, format). Pattern is deliberately
/// ignored here; the cross-contamination analyzer uses the stricter key.
fn contamination_candidates(info: &SemanticType, all: &IndexMap<String, SemanticType>) -> Vec<String> {
  all
    .values()
    .filter(|other| other.name != info.name && other.base_type == info.base_type && other.format == info.format)
    .map(|other| other.name.clone())
    .collect()
}
