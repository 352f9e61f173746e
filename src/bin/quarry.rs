//! CLI binary for quarry.

use std::path::PathBuf;

use clap::Parser;
use quarry::{ConfigOverrides, QuarryConfig};
use quarry_search::SearchEngine;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Quarry: concurrent multi-agent search results scraper.
#[derive(Parser)]
#[command(name = "quarry", version, about)]
struct Cli {
    /// Search queries to scrape.
    #[arg(short, long, num_args = 1..)]
    queries: Vec<String>,

    /// Number of concurrent agents.
    #[arg(short, long)]
    num_agents: Option<usize>,

    /// Maximum results kept per query.
    #[arg(short = 'm', long)]
    max_results: Option<usize>,

    /// Output JSON file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search engine to scrape (google, duckduckgo, bing).
    #[arg(short, long)]
    engine: Option<SearchEngine>,

    /// Domains to drop from the results.
    #[arg(short, long, num_args = 1..)]
    blacklist: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            queries: self.queries.clone(),
            num_agents: self.num_agents,
            max_results: self.max_results,
            output: self.output.clone(),
            engine: self.engine,
            blacklist: self.blacklist.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quarry=info,quarry_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = QuarryConfig::load(cli.config.as_deref())?;
    cli.overrides().apply(&mut config);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, finishing in-flight queries...");
            on_signal.cancel();
        }
    });

    let report = quarry::run(&config, shutdown).await?;

    println!(
        "Scraped {} queries, {} results -> {}",
        report.summary.queries,
        report.summary.total_results,
        config.output.display()
    );
    if report.summary.interrupted {
        println!("Run was interrupted; unprocessed queries have no results.");
    }
    Ok(())
}
