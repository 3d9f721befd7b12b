use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-depgraph")]
#[command(author, version, about = "Semantic dependency graph extraction for OpenAPI specifications")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Extract the operation dependency graph from an OpenAPI specification
  Extract(ExtractCommand),
  /// Render a previously extracted dependency graph
  Report {
    /// Path to a saved dependency graph JSON file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}

#[derive(Args, Debug)]
pub struct ExtractCommand {
  /// Path to the OpenAPI JSON or YAML specification file
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Path where the dependency graph JSON will be written
  /// (default: input path with a .graph.json extension)
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Skip the semantic type library (also disables contamination analysis)
  #[arg(long, default_value_t = false)]
  pub no_library: bool,

  /// Skip the root dependency analysis
  #[arg(long, default_value_t = false)]
  pub no_roots: bool,

  /// Skip the cross-contamination analysis
  #[arg(long, default_value_t = false)]
  pub no_contamination: bool,

  /// Suppress non-essential output (warnings only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}
