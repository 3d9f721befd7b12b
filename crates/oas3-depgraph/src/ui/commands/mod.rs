mod extract;
mod report;

pub use extract::{ExtractConfig, extract_graph};
pub use report::report_graph;
