use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use comfy_table::{Attribute, Cell, ContentArrangement, Row, Table};
use crossterm::style::Stylize;

use crate::{
  extractor::{DependencyGraphExtractor, ExtractOptions, metrics::ExtractionStats, storage::GraphFile},
  ui::{Colors, cli::ExtractCommand, colors::IntoComfyColor, term_width},
};

pub struct ExtractConfig {
  input: PathBuf,
  output: PathBuf,
  options: ExtractOptions,
  quiet: bool,
}

impl ExtractConfig {
  pub fn from_command(command: ExtractCommand) -> anyhow::Result<Self> {
    let output = command
      .output
      .unwrap_or_else(|| command.input.with_extension("graph.json"));

    Ok(Self {
      input: command.input,
      output,
      options: ExtractOptions {
        type_library: !command.no_library,
        root_analysis: !command.no_roots,
        contamination: !command.no_contamination && !command.no_library,
      },
      quiet: command.quiet,
    })
  }
}

async fn load_spec(path: &Path) -> anyhow::Result<oas3::Spec> {
  let content = tokio::fs::read_to_string(path).await?;
  let is_yaml = path
    .extension()
    .and_then(OsStr::to_str)
    .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

  if is_yaml {
    Ok(oas3::from_yaml(content)?)
  } else {
    Ok(oas3::from_json(content)?)
  }
}

pub async fn extract_graph(config: ExtractConfig, colors: &Colors) -> anyhow::Result<()> {
  let spec = load_spec(&config.input).await?;

  let extractor = DependencyGraphExtractor::new(spec, config.options);
  let (graph, stats) = extractor.extract()?;

  let file = GraphFile::from_graph(&graph);
  tokio::fs::write(&config.output, file.to_json_pretty()?).await?;

  for warning in &stats.warnings {
    eprintln!("{} {warning}", "warning:".with(colors.accent()));
  }

  if !config.quiet {
    print_summary(graph.edges.len(), &stats, &config.output, colors);
  }

  Ok(())
}

fn print_summary(edge_count: usize, stats: &ExtractionStats, output: &Path, colors: &Colors) {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  header.add_cell(Cell::new("EXTRACTION").fg(IntoComfyColor::into(colors.label())));
  header.add_cell(Cell::new("").fg(IntoComfyColor::into(colors.label())));
  table.set_header(header);

  let rows = [
    ("operations", stats.operations_extracted.to_string()),
    ("skipped", stats.operations_skipped.to_string()),
    ("semantic types", stats.semantic_types_discovered.to_string()),
    ("dependency edges", edge_count.to_string()),
    ("warnings", stats.warnings.len().to_string()),
  ];

  for (label, value) in rows {
    let mut row = Row::new();
    row.add_cell(Cell::new(label).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(
      Cell::new(value)
        .fg(IntoComfyColor::into(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    table.add_row(row);
  }

  println!("{table}");
  println!("{} {}", "graph written to".with(colors.success()), output.display());
}
