//! Scrape configuration with sensible defaults.
//!
//! [`ScrapeConfig`] controls the agent pool size, retry and backoff policy,
//! request pacing, post-processing limits, and which results page is
//! fetched. The defaults are tuned for polite scraping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SearchEngine;

/// Configuration for one scrape run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Number of concurrent agents in the pool.
    pub num_agents: usize,
    /// Maximum number of results kept per query after dedup and filtering.
    pub max_results_per_query: usize,
    /// Pause each agent takes after finishing an item, in milliseconds.
    /// Aggregate request rate is roughly `num_agents / request_delay`.
    pub request_delay_ms: u64,
    /// Per-attempt fetch timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of fetch attempts per query before giving up.
    pub max_retries: u32,
    /// Backoff unit in milliseconds; attempt `n` waits `backoff_base_ms * 2^n`.
    pub backoff_base_ms: u64,
    /// How long the pool waits for agents to stop after cancellation before
    /// aborting them, in milliseconds.
    pub shutdown_grace_ms: u64,
    /// Domains whose results are dropped from the output.
    pub blacklist: Vec<String>,
    /// Which search engine results page to scrape.
    pub engine: SearchEngine,
    /// Override for the engine's URL template. Must contain `{query}`.
    pub search_url_template: Option<String>,
    /// Custom User-Agent string. If `None`, a realistic browser User-Agent
    /// is picked from a built-in rotation list.
    pub user_agent: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            num_agents: 5,
            max_results_per_query: 10,
            request_delay_ms: 2_000,
            request_timeout_secs: 15,
            max_retries: 3,
            backoff_base_ms: 1_000,
            shutdown_grace_ms: 5_000,
            blacklist: vec!["example.com".into(), "spam-site.com".into()],
            engine: SearchEngine::Google,
            search_url_template: None,
            user_agent: None,
        }
    }
}

impl ScrapeConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `num_agents` must be greater than 0
    /// - `max_results_per_query` must be greater than 0
    /// - `request_timeout_secs` must be greater than 0
    /// - `max_retries` must be greater than 0
    /// - `search_url_template`, when set, must contain `{query}`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_agents == 0 {
            return Err(SearchError::Config(
                "num_agents must be greater than 0".into(),
            ));
        }
        if self.max_results_per_query == 0 {
            return Err(SearchError::Config(
                "max_results_per_query must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SearchError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.max_retries == 0 {
            return Err(SearchError::Config(
                "max_retries must be greater than 0".into(),
            ));
        }
        if let Some(ref template) = self.search_url_template {
            if !template.contains("{query}") {
                return Err(SearchError::Config(
                    "search_url_template must contain {query}".into(),
                ));
            }
        }
        Ok(())
    }

    /// The URL template in effect: the override if set, otherwise the engine default.
    pub fn url_template(&self) -> &str {
        self.search_url_template
            .as_deref()
            .unwrap_or_else(|| self.engine.url_template())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
