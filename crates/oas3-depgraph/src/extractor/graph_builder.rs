use std::collections::HashSet;

use indexmap::IndexMap;

use crate::extractor::model::{DependencyEdge, DependencyStrength, Operation};

/// A semantic type occurrence an operation consumes, flattened to the form
/// the strength classifier needs.
///
/// Parameter consumers are rooted at their location namespace
/// (`path.processInstanceKey`, `query.cursor`); request-body consumers keep
/// their body field path.
#[derive(Debug, Clone)]
struct ConsumedRef {
  semantic_type: String,
  field_path: String,
  required: bool,
}

fn consumed_refs(operation: &Operation) -> Vec<ConsumedRef> {
  let mut consumed = vec![];

  for param in &operation.parameters {
    if let Some(semantic_type) = &param.semantic_type {
      consumed.push(ConsumedRef {
        semantic_type: semantic_type.clone(),
        field_path: format!("{}.{}", param.location, param.name),
        required: param.required,
      });
    }
  }

  for reference in &operation.request_refs {
    consumed.push(ConsumedRef {
      semantic_type: reference.semantic_type.clone(),
      field_path: reference.field_path.clone(),
      required: reference.required,
    });
  }

  consumed
}

/// Matches every operation's produced semantic types against every other
/// operation's consumed types and emits directed edges.
///
/// Producers and consumers are indexed by semantic type first and only
/// compared within matching groups; this yields the same edge set as the
/// naive pairwise scan with better asymptotics. No self-edges; each distinct
/// field-path match is its own edge.
pub fn build_edges(operations: &IndexMap<String, Operation>) -> Vec<DependencyEdge> {
  // type name -> (producer id, source field path), deduplicated across
  // status codes that surface the same reference.
  let mut producers: IndexMap<&str, Vec<(&str, &str)>> = IndexMap::new();
  let mut seen = HashSet::new();

  for (id, operation) in operations {
    for produced in operation.produced_refs() {
      if seen.insert((id.as_str(), produced.semantic_type.as_str(), produced.field_path.as_str())) {
        producers
          .entry(produced.semantic_type.as_str())
          .or_default()
          .push((id.as_str(), produced.field_path.as_str()));
      }
    }
  }

  let mut edges = vec![];
  for (target_id, target) in operations {
    for consumed in consumed_refs(target) {
      let Some(matching) = producers.get(consumed.semantic_type.as_str()) else {
        continue;
      };
      for (source_id, source_path) in matching {
        if *source_id == target_id.as_str() {
          continue;
        }
        let strength = classify_strength(&consumed, &operations[*source_id]);
        edges.push(DependencyEdge {
          source: (*source_id).to_string(),
          target: target_id.clone(),
          semantic_type: consumed.semantic_type.clone(),
          source_path: (*source_path).to_string(),
          target_path: consumed.field_path.clone(),
          strength,
          description: format!(
            "{target_id} consumes {} at '{}' produced by {source_id} at '{source_path}'",
            consumed.semantic_type, consumed.field_path
          ),
        });
      }
    }
  }

  edges
}

/// Fixed strength precedence over the consumed reference and its producer.
fn classify_strength(consumed: &ConsumedRef, producer: &Operation) -> DependencyStrength {
  if consumed.required {
    return DependencyStrength::Required;
  }
  if producer.eventually_consistent {
    return DependencyStrength::Conditional;
  }
  if consumed.field_path.starts_with("path.") {
    // Path parameters are structurally mandatory even when undeclared.
    return DependencyStrength::Required;
  }
  if consumed.field_path.starts_with("query.") {
    return if consumed.required {
      DependencyStrength::Required
    } else {
      DependencyStrength::Optional
    };
  }
  if !consumed.field_path.contains('.') && !consumed.field_path.contains("[]") {
    // Top-level request-body field.
    return if consumed.required {
      DependencyStrength::Required
    } else {
      DependencyStrength::Optional
    };
  }
  DependencyStrength::Optional
}
