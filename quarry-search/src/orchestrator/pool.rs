//! Agent pool: fans a list of queries out to a fixed set of agents.
//!
//! # Pipeline
//!
//! 1. Validate the configuration and collapse duplicate input queries
//! 2. Seed a fresh [`TaskQueue`] and [`ResultStore`] for this run
//! 3. Spawn `num_agents` [`RetryingAgent`]s on the Tokio runtime
//! 4. Wait for the queue's join barrier (or an external shutdown)
//! 5. Close the queue, cancel the agents, and wait for them to stop within
//!    the shutdown grace period, aborting stragglers
//! 6. Run the [`PostProcessor`] on every query, in input order
//!
//! Agents are owned by a [`JoinSet`] for the duration of the call. Dropping
//! the `run` future part-way aborts them, so nothing outlives the call.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::agent::{AgentStats, RetryingAgent};
use crate::config::ScrapeConfig;
use crate::engine::{Fetcher, ResultParser};
use crate::engines::EngineParser;
use crate::error::SearchError;
use crate::http::HttpFetcher;
use crate::queue::TaskQueue;
use crate::store::ResultStore;
use crate::types::{Query, SearchResults};

use super::postprocess::PostProcessor;

/// A reusable pool definition. Each call to [`run`](Self::run) creates its
/// own queue, store and agents; nothing is shared between runs.
#[derive(Debug)]
pub struct AgentPool<F, P> {
    config: ScrapeConfig,
    fetcher: Arc<F>,
    parser: Arc<P>,
    post: PostProcessor,
}

impl AgentPool<HttpFetcher, EngineParser> {
    /// Build a pool that fetches over HTTP and parses with the configured
    /// engine's parser.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid configuration and
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: ScrapeConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        let parser = EngineParser::new(config.engine);
        Self::new(config, fetcher, parser)
    }
}

impl<F, P> AgentPool<F, P>
where
    F: Fetcher + 'static,
    P: ResultParser + 'static,
{
    /// Build a pool around the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(config: ScrapeConfig, fetcher: F, parser: P) -> Result<Self, SearchError> {
        config.validate()?;
        let post = PostProcessor::from_config(&config);
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            parser: Arc::new(parser),
            post,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Process every query and return the post-processed results.
    ///
    /// The returned mapping has exactly one entry per distinct input query,
    /// in input order. Queries whose retries were exhausted map to an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Only setup failures are returned (no Tokio runtime to spawn agents
    /// on). Per-query failures are logged and degrade to empty lists.
    pub async fn run<I, S>(&self, queries: I) -> Result<SearchResults, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Query>,
    {
        self.run_until(queries, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but stops early when `shutdown` is cancelled.
    ///
    /// On early shutdown the agents finish the query they are working on,
    /// unprocessed queries map to an empty list, and the run still returns
    /// an entry for every input query.
    pub async fn run_until<I, S>(
        &self,
        queries: I,
        shutdown: CancellationToken,
    ) -> Result<SearchResults, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Query>,
    {
        let queries = distinct_queries(queries);
        if queries.is_empty() {
            debug!("no queries to run");
            return Ok(SearchResults::new());
        }

        let runtime = Handle::try_current()
            .map_err(|e| SearchError::Agent(format!("no Tokio runtime available: {e}")))?;

        let queue = Arc::new(TaskQueue::new());
        for query in &queries {
            queue.enqueue(query.clone())?;
        }
        let store = Arc::new(ResultStore::new());
        let cancel = shutdown.child_token();

        info!(
            agents = self.config.num_agents,
            queries = queries.len(),
            engine = %self.config.engine,
            "starting agent pool"
        );

        let mut agents = JoinSet::new();
        for id in 0..self.config.num_agents {
            let agent = RetryingAgent::new(
                id,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.parser),
                &self.config,
            );
            agents.spawn_on(
                agent.run(Arc::clone(&queue), Arc::clone(&store), cancel.clone()),
                &runtime,
            );
        }

        let interrupted = tokio::select! {
            () = queue.join() => false,
            () = shutdown.cancelled() => true,
        };
        if interrupted {
            warn!(
                unfinished = queue.in_flight(),
                "shutdown requested before all queries finished"
            );
        }

        queue.close();
        cancel.cancel();
        self.stop_agents(agents).await;

        let mut accumulated = store.take();
        let mut output = SearchResults::new();
        for query in queries {
            let raw = accumulated.remove(&query).unwrap_or_default();
            let processed = self.post.apply(&raw);
            debug!(raw = raw.len(), kept = processed.len(), "query post-processed");
            output.insert(query, processed);
        }

        info!(
            queries = output.len(),
            results = output.total_results(),
            "agent pool finished"
        );
        Ok(output)
    }

    /// Wait for every agent to stop, aborting any still running after the
    /// grace period. Aborted agents are awaited as well, so none is left
    /// writing to the store once this returns.
    async fn stop_agents(&self, mut agents: JoinSet<AgentStats>) {
        let grace = self.config.shutdown_grace();
        let mut totals = AgentStats::default();

        let stopped = tokio::time::timeout(grace, async {
            while let Some(outcome) = agents.join_next().await {
                tally(&mut totals, outcome);
            }
        })
        .await;

        if stopped.is_err() {
            warn!(
                remaining = agents.len(),
                grace_ms = grace.as_millis() as u64,
                "agents did not stop within grace period, aborting"
            );
            agents.abort_all();
            let reaped = tokio::time::timeout(grace, async {
                while let Some(outcome) = agents.join_next().await {
                    tally(&mut totals, outcome);
                }
            })
            .await;
            if reaped.is_err() {
                error!(remaining = agents.len(), "aborted agents did not terminate");
            }
        }

        debug!(
            processed = totals.processed,
            failed = totals.failed,
            "all agents stopped"
        );
    }
}

fn tally(totals: &mut AgentStats, outcome: Result<AgentStats, JoinError>) {
    match outcome {
        Ok(stats) => {
            totals.processed += stats.processed;
            totals.failed += stats.failed;
        }
        Err(err) if err.is_panic() => {
            error!(error = %err, "agent panicked");
        }
        Err(err) if err.is_cancelled() => {
            debug!("agent aborted");
        }
        Err(err) => {
            warn!(error = %err, "agent task did not complete");
        }
    }
}

/// Input queries with later duplicates removed, order preserved.
fn distinct_queries<I, S>(queries: I) -> Vec<Query>
where
    I: IntoIterator<Item = S>,
    S: Into<Query>,
{
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .map(Into::into)
        .filter(|q: &Query| {
            let fresh = seen.insert(q.clone());
            if !fresh {
                debug!("dropping duplicate input query");
            }
            fresh
        })
        .collect()
}
