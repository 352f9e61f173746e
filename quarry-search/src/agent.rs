//! Retrying agent: one concurrent worker of the pool.
//!
//! An agent repeatedly takes a query from the shared [`TaskQueue`], runs a
//! bounded retry sequence of fetch + parse against it, records whatever it
//! got into the [`ResultStore`], marks the item done, and pauses before
//! taking the next one.
//!
//! # Retry policy
//!
//! ```text
//! attempt 0 ── fail ── wait base·1 ── attempt 1 ── fail ── wait base·2 ── attempt 2 ── fail ── wait base·4 ── give up → []
//!     │                                  │                                   │
//!     └─ ok → results                    └─ ok → results                     └─ ok → results
//! ```
//!
//! Every attempt is bounded by the request timeout. Failures never escape
//! [`RetryingAgent::process`]; an exhausted query yields an empty list.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::config::ScrapeConfig;
use crate::engine::{Fetcher, ResultParser};
use crate::error::SearchError;
use crate::queue::TaskQueue;
use crate::store::ResultStore;
use crate::types::SearchResult;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per query.
    pub max_retries: u32,
    /// Wait after failed attempt `n` is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Upper bound on a single fetch.
    pub request_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Backoff after failed attempt `attempt` (zero-based). Saturates
    /// instead of overflowing for large attempt numbers.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base.saturating_mul(factor)
    }
}

/// How one query's retry sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// An attempt fetched and parsed successfully.
    Success {
        results: Vec<SearchResult>,
        attempts: u32,
    },
    /// Every attempt failed.
    Exhausted { attempts: u32, last_error: String },
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// The results of a successful sequence, or an empty list.
    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            Self::Success { results, .. } => results,
            Self::Exhausted { .. } => Vec::new(),
        }
    }
}

/// Per-agent counters reported when the agent stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStats {
    pub id: usize,
    /// Queries taken from the queue.
    pub processed: usize,
    /// Queries whose retries were exhausted.
    pub failed: usize,
}

/// A worker that fetches and parses queries with bounded retries.
///
/// Holds no shared state besides the collaborators it was given; the queue
/// and store are passed to [`run`](Self::run).
#[derive(Debug)]
pub struct RetryingAgent<F, P> {
    id: usize,
    fetcher: Arc<F>,
    parser: Arc<P>,
    policy: RetryPolicy,
    request_delay: Duration,
}

impl<F, P> RetryingAgent<F, P>
where
    F: Fetcher,
    P: ResultParser,
{
    pub fn new(id: usize, fetcher: Arc<F>, parser: Arc<P>, config: &ScrapeConfig) -> Self {
        Self {
            id,
            fetcher,
            parser,
            policy: RetryPolicy::from_config(config),
            request_delay: config.request_delay(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Fetch and parse `query`, retrying on failure. Always returns; an
    /// exhausted retry sequence yields an empty list.
    pub async fn process(&self, query: &str) -> Vec<SearchResult> {
        self.process_with_outcome(query).await.into_results()
    }

    /// Like [`process`](Self::process) but reports how the sequence ended.
    pub async fn process_with_outcome(&self, query: &str) -> QueryOutcome {
        let mut last_error = String::new();

        for attempt in 0..self.policy.max_retries {
            match self.attempt(query).await {
                Ok(results) => {
                    debug!(
                        agent_id = self.id,
                        attempt = attempt + 1,
                        count = results.len(),
                        "query succeeded"
                    );
                    return QueryOutcome::Success {
                        results,
                        attempts: attempt + 1,
                    };
                }
                Err(err) => {
                    warn!(
                        agent_id = self.id,
                        attempt = attempt + 1,
                        error = %err,
                        "fetch attempt failed"
                    );
                    last_error = err.to_string();
                    tokio::time::sleep(self.policy.backoff_for(attempt)).await;
                }
            }
        }

        error!(
            agent_id = self.id,
            attempts = self.policy.max_retries,
            error = %last_error,
            "all attempts failed"
        );
        QueryOutcome::Exhausted {
            attempts: self.policy.max_retries,
            last_error,
        }
    }

    /// One fetch (bounded by the request timeout) followed by one parse.
    async fn attempt(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let timeout = self.policy.request_timeout;
        let raw = tokio::time::timeout(timeout, self.fetcher.fetch(query))
            .await
            .map_err(|_| SearchError::Timeout(format!("no response within {}ms", timeout.as_millis())))??;
        self.parser.parse(&raw)
    }

    /// [`process_with_outcome`](Self::process_with_outcome) with panics from
    /// the fetcher or parser caught and reported as an exhausted query, so
    /// the agent keeps draining the queue.
    async fn process_guarded(&self, query: &str) -> QueryOutcome {
        match AssertUnwindSafe(self.process_with_outcome(query))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(agent_id = self.id, panic = %message, "query processing panicked");
                QueryOutcome::Exhausted {
                    attempts: 0,
                    last_error: format!("panicked: {message}"),
                }
            }
        }
    }

    /// Drain `queue` until it closes or `cancel` fires.
    ///
    /// Cancellation is checked before each dequeue and while waiting for an
    /// item or sleeping between items. A query already being processed is
    /// always finished and recorded before the agent stops.
    pub async fn run(
        self,
        queue: Arc<TaskQueue>,
        store: Arc<ResultStore>,
        cancel: CancellationToken,
    ) -> AgentStats {
        let mut stats = AgentStats {
            id: self.id,
            ..AgentStats::default()
        };
        debug!(agent_id = self.id, "agent started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let ticket = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                next = queue.dequeue() => match next {
                    Some(ticket) => ticket,
                    None => break,
                },
            };

            trace!(agent_id = self.id, query = ticket.query(), "processing query");
            let outcome = self.process_guarded(ticket.query()).await;
            stats.processed += 1;
            if !outcome.is_success() {
                stats.failed += 1;
            }
            store.record(ticket.query(), outcome.into_results());
            queue.mark_done(ticket);

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.request_delay) => {}
            }
        }

        debug!(
            agent_id = self.id,
            processed = stats.processed,
            failed = stats.failed,
            "agent stopped"
        );
        stats
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
