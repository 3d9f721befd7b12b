use clap::Parser;
use oas3_depgraph::ui::{self, Cli, Colors, Commands, colors};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::Extract(command) => {
      let config = ui::commands::ExtractConfig::from_command(command)?;
      ui::commands::extract_graph(config, &colors).await?;
    }
    Commands::Report { input } => ui::commands::report_graph(&input, &colors).await?,
  }

  Ok(())
}
