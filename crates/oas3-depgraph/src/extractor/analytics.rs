use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::extractor::model::OperationDependencyGraph;

/// Derived read-only analytics over a dependency graph.
///
/// Recomputed on demand; never stored inside the graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphAnalytics {
  /// Operations that never appear as an edge target.
  pub entry_points: Vec<String>,
  /// Operations that never appear as an edge source.
  pub sinks: Vec<String>,
  /// Edge count per semantic type, descending.
  pub type_usage: Vec<(String, usize)>,
  /// Approximate mutual-dependency clusters; singletons discarded.
  pub clusters: Vec<Vec<String>>,
}

impl GraphAnalytics {
  pub fn compute(graph: &OperationDependencyGraph) -> Self {
    Self {
      entry_points: entry_points(graph),
      sinks: sinks(graph),
      type_usage: type_usage(graph),
      clusters: clusters(graph),
    }
  }
}

/// Operations with no incoming edges, in extraction order.
pub fn entry_points(graph: &OperationDependencyGraph) -> Vec<String> {
  let targets: HashSet<&str> = graph.edges.iter().map(|e| e.target.as_str()).collect();
  graph
    .operations
    .keys()
    .filter(|id| !targets.contains(id.as_str()))
    .cloned()
    .collect()
}

fn sinks(graph: &OperationDependencyGraph) -> Vec<String> {
  let sources: HashSet<&str> = graph.edges.iter().map(|e| e.source.as_str()).collect();
  graph
    .operations
    .keys()
    .filter(|id| !sources.contains(id.as_str()))
    .cloned()
    .collect()
}

fn type_usage(graph: &OperationDependencyGraph) -> Vec<(String, usize)> {
  let mut counts: IndexMap<&str, usize> = IndexMap::new();
  for edge in &graph.edges {
    *counts.entry(edge.semantic_type.as_str()).or_default() += 1;
  }

  counts
    .into_iter()
    .map(|(name, n)| (name.to_string(), n))
    .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
    .collect()
}

/// One-hop mutual-edge grouping. Deliberately not a strongly-connected
/// components pass: two operations cluster only when each has a direct edge
/// to the other, so larger cycles are under-reported. A petgraph SCC over
/// the same edge list is the drop-in upgrade if that ever matters.
fn clusters(graph: &OperationDependencyGraph) -> Vec<Vec<String>> {
  let mut edge_graph = DiGraphMap::<&str, ()>::new();
  for id in graph.operations.keys() {
    edge_graph.add_node(id.as_str());
  }
  for edge in &graph.edges {
    edge_graph.add_edge(edge.source.as_str(), edge.target.as_str(), ());
  }

  let mut visited: HashSet<&str> = HashSet::new();
  let mut groups = vec![];

  for id in graph.operations.keys() {
    let id = id.as_str();
    if visited.contains(id) {
      continue;
    }
    visited.insert(id);

    let mut group = vec![id.to_string()];
    for other in graph.operations.keys() {
      let other = other.as_str();
      if other != id
        && !visited.contains(other)
        && edge_graph.contains_edge(id, other)
        && edge_graph.contains_edge(other, id)
      {
        visited.insert(other);
        group.push(other.to_string());
      }
    }

    if group.len() > 1 {
      groups.push(group);
    }
  }

  groups
}
