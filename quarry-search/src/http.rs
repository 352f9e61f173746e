//! HTTP fetcher for search engine results pages.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and a rotating User-Agent, plus [`HttpFetcher`], the
//! production [`Fetcher`] that issues one GET per attempt.

use crate::config::ScrapeConfig;
use crate::engine::Fetcher;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use reqwest::StatusCode;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for results-page scraping.
///
/// The client has:
/// - Cookie store enabled (for consent pages, etc.)
/// - Timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ScrapeConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Substitute the percent-encoded `query` into a URL template.
///
/// # Examples
///
/// ```
/// use quarry_search::http::render_url;
///
/// let url = render_url("https://www.google.com/search?q={query}&num=100", "rust & go");
/// assert_eq!(url, "https://www.google.com/search?q=rust+%26+go&num=100");
/// ```
pub fn render_url(template: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    template.replace("{query}", &encoded)
}

/// Fetches results pages with a single shared client.
///
/// Cheap to share: every agent in a pool holds the same instance behind an
/// `Arc`, so connections are pooled across agents.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    template: String,
}

impl HttpFetcher {
    /// Build a fetcher from the config's client settings and URL template.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &ScrapeConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(config)?,
            template: config.url_template().to_string(),
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, query: &str) -> Result<String, SearchError> {
        let url = render_url(&self.template, query);
        tracing::trace!(query, %url, "fetching results page");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(format!("request to {url} timed out"))
                } else {
                    SearchError::Http(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "results page returned non-200 status");
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "results page received");
        Ok(body)
    }
}
