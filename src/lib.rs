//! Quarry: scrape search engine results for a list of queries with a pool
//! of concurrent agents and save them as JSON.
//!
//! The scraping engine lives in the `quarry-search` crate. This crate adds
//! the application layer around it:
//!
//! - [`QuarryConfig`]: TOML configuration with command-line overrides
//! - [`run`]: one complete run, from configuration to the written output file
//! - [`output`]: JSON persistence and the run summary

pub mod config;
pub mod error;
pub mod output;

pub use config::{ConfigOverrides, QuarryConfig};
pub use error::{QuarryError, Result};
pub use output::RunSummary;

use quarry_search::{AgentPool, SearchResults};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Results of a finished run along with its summary.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: SearchResults,
    pub summary: RunSummary,
}

/// Scrape every configured query and write the results to `config.output`.
///
/// Cancelling `shutdown` stops the run early; the queries that were not
/// processed map to empty lists and the output is still written.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be built, or the output file cannot be written.
pub async fn run(config: &QuarryConfig, shutdown: CancellationToken) -> Result<RunReport> {
    config.validate()?;

    let pool = AgentPool::from_config(config.scrape.clone())?;
    info!(
        queries = config.queries.len(),
        output = %config.output.display(),
        "starting scrape"
    );

    let results = pool
        .run_until(config.queries.iter().cloned(), shutdown.clone())
        .await?;
    let summary = RunSummary::from_results(&results, shutdown.is_cancelled());

    output::write_results(&config.output, &results)?;
    info!(path = %config.output.display(), "results saved");
    summary.log(&results);

    Ok(RunReport { results, summary })
}
