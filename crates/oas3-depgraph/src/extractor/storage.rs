use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extractor::model::{
  CrossContaminationMap, DependencyEdge, Operation, OperationDependencyGraph, RootOperationAnalysis, SemanticType,
  SemanticTypeLibrary,
};

/// Counts and provenance recorded alongside a persisted graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFileMetadata {
  pub extracted_at: DateTime<Utc>,
  pub operation_count: usize,
  pub semantic_type_count: usize,
  pub edge_count: usize,
}

/// Flattened, serializable form of [`OperationDependencyGraph`]: the two
/// keyed maps become entry arrays (each entry carries its own key), plus a
/// metadata block. Enrichments are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
  pub metadata: GraphFileMetadata,
  pub operations: Vec<Operation>,
  pub semantic_types: Vec<SemanticType>,
  pub edges: Vec<DependencyEdge>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub type_library: Option<SemanticTypeLibrary>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root_analysis: Option<RootOperationAnalysis>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contamination: Option<CrossContaminationMap>,
}

impl GraphFile {
  pub fn from_graph(graph: &OperationDependencyGraph) -> Self {
    Self {
      metadata: GraphFileMetadata {
        extracted_at: Utc::now(),
        operation_count: graph.operations.len(),
        semantic_type_count: graph.semantic_types.len(),
        edge_count: graph.edges.len(),
      },
      operations: graph.operations.values().cloned().collect(),
      semantic_types: graph.semantic_types.values().cloned().collect(),
      edges: graph.edges.clone(),
      type_library: graph.type_library.clone(),
      root_analysis: graph.root_analysis.clone(),
      contamination: graph.contamination.clone(),
    }
  }

  /// Reconstructs the in-memory graph; operations key by id, semantic types
  /// by name, exactly as the original maps were keyed.
  pub fn into_graph(self) -> OperationDependencyGraph {
    OperationDependencyGraph {
      operations: self.operations.into_iter().map(|op| (op.id.clone(), op)).collect(),
      semantic_types: self.semantic_types.into_iter().map(|st| (st.name.clone(), st)).collect(),
      edges: self.edges,
      type_library: self.type_library,
      root_analysis: self.root_analysis,
      contamination: self.contamination,
    }
  }

  pub fn to_json_pretty(&self) -> anyhow::Result<String> {
    serde_json::to_string_pretty(self).context("failed to serialize dependency graph")
  }

  /// Fatal only to the load itself; extraction is unaffected.
  pub fn from_json(content: &str) -> anyhow::Result<Self> {
    serde_json::from_str(content).context("malformed dependency graph file")
  }
}
