use oas3::Spec;

use crate::extractor::{
  contamination, graph_builder,
  metrics::ExtractionStats,
  model::OperationDependencyGraph,
  operations::OperationExtractor,
  resolver::{SchemaResolver, SemanticTypeInference, SemanticTypeRegistry, SuffixInference},
  roots,
  type_library::TypeLibraryBuilder,
};

/// Which enrichments to attach to the extracted graph.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
  pub type_library: bool,
  pub root_analysis: bool,
  pub contamination: bool,
}

impl Default for ExtractOptions {
  fn default() -> Self {
    Self {
      type_library: true,
      root_analysis: true,
      contamination: true,
    }
  }
}

/// High-level entry point for the extraction pipeline.
///
/// Synchronous and side-effect-free over its input: one call, one complete
/// graph. Partial results are never exposed; recoverable defects surface as
/// warnings in the returned stats. Independent extractors over distinct
/// documents are safe to run concurrently.
pub struct DependencyGraphExtractor {
  spec: Spec,
  options: ExtractOptions,
}

impl DependencyGraphExtractor {
  pub fn new(spec: Spec, options: ExtractOptions) -> Self {
    Self { spec, options }
  }

  /// Runs the full pipeline: schema resolution, operation extraction, edge
  /// building, then the enabled enrichments.
  pub fn extract(&self) -> anyhow::Result<(OperationDependencyGraph, ExtractionStats)> {
    self.extract_with_inference(&SuffixInference)
  }

  /// Same pipeline with a caller-supplied semantic type inference strategy.
  pub fn extract_with_inference(
    &self,
    inference: &dyn SemanticTypeInference,
  ) -> anyhow::Result<(OperationDependencyGraph, ExtractionStats)> {
    let mut stats = ExtractionStats::default();
    let mut registry = SemanticTypeRegistry::default();

    let resolver = SchemaResolver::new(&self.spec, inference);
    let operations = OperationExtractor::new(&self.spec, &resolver).extract_all(&mut registry, &mut stats);

    let edges = graph_builder::build_edges(&operations);
    stats.record_edges(edges.len());

    let semantic_types = registry.into_types();

    let type_library = self
      .options
      .type_library
      .then(|| TypeLibraryBuilder::new(&self.spec).build(&semantic_types, &mut stats));

    let contamination = match (&type_library, self.options.contamination) {
      (Some(library), true) => Some(contamination::analyze(&semantic_types, library)),
      _ => None,
    };

    let root_analysis = self.options.root_analysis.then(|| roots::analyze(&operations, &edges));

    let graph = OperationDependencyGraph {
      operations,
      semantic_types,
      edges,
      type_library,
      root_analysis,
      contamination,
    };
    graph.validate()?;

    Ok((graph, stats))
  }
}
