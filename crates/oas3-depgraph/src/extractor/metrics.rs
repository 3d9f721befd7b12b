use strum::Display;

/// Counters and non-fatal warnings collected during one extraction run.
///
/// The engine never fails on a defective document; everything recoverable
/// lands here and the affected item is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionStats {
  pub operations_extracted: usize,
  pub operations_skipped: usize,
  pub semantic_types_discovered: usize,
  pub edges_built: usize,
  pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionStats {
  pub fn record_operation(&mut self) {
    self.operations_extracted += 1;
  }

  pub fn record_skipped_operation(&mut self, warning: ExtractionWarning) {
    self.operations_skipped += 1;
    self.record_warning(warning);
  }

  pub fn record_semantic_type(&mut self) {
    self.semantic_types_discovered += 1;
  }

  pub fn record_edges(&mut self, count: usize) {
    self.edges_built += count;
  }

  pub fn record_warning(&mut self, warning: ExtractionWarning) {
    self.warnings.push(warning);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ExtractionWarning {
  #[strum(to_string = "Skipping '{method} {path}': no operationId")]
  MissingOperationId { method: String, path: String },
  #[strum(to_string = "Unresolvable reference in {context}")]
  UnresolvedReference { context: String },
  #[strum(to_string = "[{operation_id}] response {status} declares no content")]
  MissingResponseContent { operation_id: String, status: String },
  #[strum(to_string = "Semantic type '{name}' re-declared with conflicting {field}; keeping first value")]
  ConflictingSemanticType { name: String, field: String },
  #[strum(to_string = "Semantic type '{name}' has invalid pattern '{pattern}'")]
  InvalidPattern { name: String, pattern: String },
}
