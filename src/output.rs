//! Persisting run results and summarising them.

use std::path::Path;

use quarry_search::SearchResults;
use tracing::{info, warn};

use crate::error::Result;

/// Write `results` to `path` as a pretty-printed JSON object, creating
/// parent directories as needed. Keys keep input query order.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_results(path: &Path, results: &SearchResults) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(results)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Counts describing a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub queries: usize,
    pub total_results: usize,
    /// Queries that ended with no results, in input order.
    pub empty: Vec<String>,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn from_results(results: &SearchResults, interrupted: bool) -> Self {
        Self {
            queries: results.len(),
            total_results: results.total_results(),
            empty: results
                .iter()
                .filter(|(_, hits)| hits.is_empty())
                .map(|(query, _)| query.to_owned())
                .collect(),
            interrupted,
        }
    }

    /// Log one line per query plus a run total.
    pub fn log(&self, results: &SearchResults) {
        for (query, hits) in results.iter() {
            info!(query, results = hits.len(), "query summary");
        }
        if !self.empty.is_empty() {
            warn!(count = self.empty.len(), "some queries returned no results");
        }
        info!(
            queries = self.queries,
            results = self.total_results,
            interrupted = self.interrupted,
            "run complete"
        );
    }
}
