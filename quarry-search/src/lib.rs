//! # quarry-search
//!
//! Concurrent multi-agent search scraping for Quarry.
//!
//! A fixed pool of agents drains a shared queue of search queries, fetches
//! each query's results page with bounded retries, and the pool merges,
//! deduplicates, and filters what came back before returning it.
//!
//! ## Design
//!
//! - [`TaskQueue`]: multi-consumer FIFO with a join barrier; dequeued items
//!   are marked done through a drop guard so `join` can never stall
//! - [`RetryingAgent`]: fetch + parse with per-attempt timeout and
//!   exponential backoff; always returns, degrading to an empty list
//! - [`AgentPool`]: per-run queue and store, `num_agents` Tokio tasks,
//!   cooperative cancellation with a bounded shutdown grace period
//! - [`PostProcessor`]: dedup by URL, domain blacklist, truncation
//! - [`Fetcher`] / [`ResultParser`]: the two collaborator seams; the crate
//!   ships [`HttpFetcher`] and parsers for Google, DuckDuckGo, and Bing
//!
//! ## Logging
//!
//! - Query text is logged only at trace level
//! - Failed attempts are logged at warn level, exhausted queries at error

pub mod agent;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod queue;
pub mod store;
pub mod types;

pub use agent::{AgentStats, QueryOutcome, RetryPolicy, RetryingAgent};
pub use config::ScrapeConfig;
pub use engine::{Fetcher, ResultParser};
pub use engines::EngineParser;
pub use error::{Result, SearchError};
pub use http::HttpFetcher;
pub use orchestrator::{AgentPool, PostProcessor};
pub use queue::{TaskQueue, Ticket};
pub use store::ResultStore;
pub use types::{Query, SearchEngine, SearchResult, SearchResults};

/// Scrape every query over HTTP using `config`.
///
/// Builds an [`AgentPool`] with [`HttpFetcher`] and the parser for
/// `config.engine`, runs it, and returns one entry per distinct query.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the configuration is invalid, or
/// [`SearchError::Http`] if the HTTP client cannot be built. Individual
/// query failures are not errors; those queries map to an empty list.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> quarry_search::Result<()> {
/// let config = quarry_search::ScrapeConfig::default();
/// let results = quarry_search::scrape(["rust programming", "tokio"], &config).await?;
/// for (query, hits) in results.iter() {
///     println!("{query}: {} results", hits.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn scrape<I, S>(queries: I, config: &ScrapeConfig) -> Result<SearchResults>
where
    I: IntoIterator<Item = S>,
    S: Into<Query>,
{
    AgentPool::from_config(config.clone())?.run(queries).await
}
