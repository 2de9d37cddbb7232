mod search;
mod sources;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pharmscan-cli")]
#[command(about = "Compare medicine prices across online pharmacies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every enabled pharmacy for a medicine
    Search {
        /// Medicine name to look up (e.g. "Dolo 650")
        term: String,

        /// Order results by numeric price, unpriced listings last
        #[arg(long)]
        sort_price: bool,

        /// Print the raw `{data, error}` response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the configured pharmacy sources
    Sources {
        /// Fail if the sources file cannot be loaded instead of falling back
        /// to the built-in defaults
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pharmscan_core::load_app_config()?;

    // Logs go to stderr so `search --json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(
        env = %config.env,
        sources_path = %config.sources_path.display(),
        "configuration loaded"
    );

    match cli.command {
        Some(Commands::Search {
            term,
            sort_price,
            json,
        }) => search::run_search(&config, &term, sort_price, json).await?,
        Some(Commands::Sources { strict }) => sources::run_sources(&config, strict)?,
        None => println!("no command given; run `pharmscan-cli --help` for usage"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
