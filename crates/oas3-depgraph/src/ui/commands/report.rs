use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use crossterm::style::Stylize;

use crate::{
  extractor::{analytics::GraphAnalytics, storage::GraphFile},
  ui::{Colors, colors::IntoComfyColor, term_width},
};

pub async fn report_graph(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let content = tokio::fs::read_to_string(input).await?;
  let graph = GraphFile::from_json(&content)?.into_graph();
  let analytics = GraphAnalytics::compute(&graph);

  println!(
    "{} {} operations, {} semantic types, {} edges",
    "graph:".with(colors.label()),
    graph.operations.len(),
    graph.semantic_types.len(),
    graph.edges.len()
  );
  println!();

  print_operation_list("ENTRY POINTS", &analytics.entry_points, colors);
  print_operation_list("SINKS", &analytics.sinks, colors);
  print_type_usage(&analytics.type_usage, colors);
  print_clusters(&analytics.clusters, colors);

  if let Some(roots) = &graph.root_analysis {
    print_bootstrap_sequences(&roots.bootstrap_sequences, colors);
  }

  Ok(())
}

fn new_table() -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());
  table
}

fn header_row(labels: &[&str], colors: &Colors) -> Row {
  let mut row = Row::new();
  for label in labels {
    row.add_cell(Cell::new(label).fg(IntoComfyColor::into(colors.label())));
  }
  row
}

fn print_operation_list(title: &str, operation_ids: &[String], colors: &Colors) {
  if operation_ids.is_empty() {
    return;
  }

  let mut table = new_table();
  table.set_header(header_row(&[title], colors));
  for id in operation_ids {
    let mut row = Row::new();
    row.add_cell(Cell::new(id).fg(IntoComfyColor::into(colors.value())));
    table.add_row(row);
  }
  println!("{table}");
}

fn print_type_usage(usage: &[(String, usize)], colors: &Colors) {
  if usage.is_empty() {
    return;
  }

  let mut table = new_table();
  table.set_header(header_row(&["SEMANTIC TYPE", "EDGES"], colors));
  for (name, count) in usage {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(name)
        .fg(IntoComfyColor::into(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(count)
        .fg(IntoComfyColor::into(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    table.add_row(row);
  }
  println!("{table}");
}

fn print_clusters(clusters: &[Vec<String>], colors: &Colors) {
  if clusters.is_empty() {
    return;
  }

  let mut table = new_table();
  table.set_header(header_row(&["CLUSTER", "OPERATIONS"], colors));
  for (i, cluster) in clusters.iter().enumerate() {
    let mut row = Row::new();
    row.add_cell(Cell::new(i + 1).fg(IntoComfyColor::into(colors.accent())));
    row.add_cell(Cell::new(cluster.join(", ")).fg(IntoComfyColor::into(colors.primary())));
    table.add_row(row);
  }
  println!("{table}");
}

fn print_bootstrap_sequences(sequences: &[crate::extractor::model::BootstrapSequence], colors: &Colors) {
  if sequences.is_empty() {
    return;
  }

  let mut table = new_table();
  table.set_header(header_row(&["BOOTSTRAP SEQUENCE", "OPERATIONS", "PRODUCES"], colors));
  for sequence in sequences {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&sequence.name)
        .fg(IntoComfyColor::into(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(sequence.operations.join(" -> ")).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(Cell::new(sequence.produces.join(", ")).fg(IntoComfyColor::into(colors.info())));
    table.add_row(row);
  }
  println!("{table}");
}
