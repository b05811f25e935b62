//! Audiomark CLI
//!
//! Command-line interface for the Audiomark watermark codec and band
//! segmentation engine.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audiomark::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Audiomark v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Embed { input, output } => {
            commands::embed(&config, &input, output.as_deref())?;
        }
        Commands::Strip { input, output } => {
            commands::strip(&config, &input, output.as_deref())?;
        }
        Commands::Check { input } => {
            if !commands::check(&config, &input)? {
                std::process::exit(1);
            }
        }
        Commands::Segment {
            input,
            output,
            legacy_bands,
        } => {
            commands::segment(&config, &input, output.as_deref(), legacy_bands)?;
        }
        Commands::Info { input } => commands::info(&input)?,
        Commands::PrintConfig => commands::print_config(&config)?,
    }

    Ok(())
}
