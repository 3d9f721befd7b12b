use indexmap::IndexMap;

use crate::extractor::{
  model::{
    ContaminationEntry, ContaminationScenario, ContaminationSeverity, CrossContaminationMap, ExpectedOutcome,
    PrimitiveType, SemanticType, SemanticTypeLibrary,
  },
  type_library::is_identifier_name,
};

/// Patterns that mark structurally indistinguishable numeric identifiers,
/// the most dangerous contamination family.
const NUMERIC_ID_PATTERNS: &[&str] = &["^-?[0-9]+$", "^[0-9]+$", "^-?\\d+$", "^\\d+$"];

/// Valid examples borrowed per candidate when generating scenarios.
const SCENARIO_EXAMPLES_PER_CANDIDATE: usize = 3;

fn signature(info: &SemanticType) -> (PrimitiveType, Option<&str>, Option<&str>) {
  (info.base_type, info.format.as_deref(), info.pattern.as_deref())
}

fn is_numeric_identifier(info: &SemanticType) -> bool {
  info.base_type == PrimitiveType::String
    && info
      .pattern
      .as_deref()
      .is_some_and(|pattern| NUMERIC_ID_PATTERNS.contains(&pattern))
}

/// Derives, per semantic type, the other types a caller could substitute by
/// mistake, with a severity grade and ready-made rejection scenarios.
///
/// Grouping key here is the full structural signature (base type, format,
/// pattern); the type library's candidate list intentionally uses the looser
/// (base type, format) key.
pub fn analyze(types: &IndexMap<String, SemanticType>, library: &SemanticTypeLibrary) -> CrossContaminationMap {
  let mut entries = IndexMap::new();

  for (name, info) in types {
    let candidates = candidates_for(info, types);
    let severity = classify_severity(name, candidates.len());
    let scenarios = scenarios_for(name, &candidates, library);

    entries.insert(
      name.clone(),
      ContaminationEntry {
        candidates,
        severity,
        scenarios,
      },
    );
  }

  CrossContaminationMap { entries }
}

fn candidates_for(info: &SemanticType, types: &IndexMap<String, SemanticType>) -> Vec<String> {
  let in_identifier_family = is_identifier_name(&info.name) && is_numeric_identifier(info);

  types
    .values()
    .filter(|other| other.name != info.name)
    .filter(|other| {
      if signature(other) == signature(info) {
        return true;
      }
      // Distinct identifier types that all look like numeric strings are
      // mutually substitutable even when formats differ slightly.
      in_identifier_family && is_identifier_name(&other.name) && is_numeric_identifier(other)
    })
    .map(|other| other.name.clone())
    .collect()
}

fn classify_severity(name: &str, candidate_count: usize) -> ContaminationSeverity {
  if candidate_count >= 5 && is_identifier_name(name) {
    ContaminationSeverity::High
  } else if candidate_count >= 2 {
    ContaminationSeverity::Medium
  } else {
    ContaminationSeverity::Low
  }
}

fn scenarios_for(target: &str, candidates: &[String], library: &SemanticTypeLibrary) -> Vec<ContaminationScenario> {
  candidates
    .iter()
    .flat_map(|candidate| {
      let examples = library
        .types
        .get(candidate)
        .map(|def| def.valid_examples.as_slice())
        .unwrap_or_default();

      examples
        .iter()
        .take(SCENARIO_EXAMPLES_PER_CANDIDATE)
        .map(|value| ContaminationScenario {
          target_type: target.to_string(),
          candidate_type: candidate.clone(),
          value: value.clone(),
          expected: ExpectedOutcome::Reject,
        })
    })
    .collect()
}
