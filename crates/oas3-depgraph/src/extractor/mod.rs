pub mod analytics;
pub mod contamination;
pub mod graph_builder;
pub mod metrics;
pub mod model;
pub mod operations;
pub mod pipeline;
pub mod resolver;
pub mod roots;
pub mod storage;
pub mod type_library;

pub use pipeline::{DependencyGraphExtractor, ExtractOptions};

#[cfg(test)]
mod tests;
