//! Result post-processing: dedup by URL, blacklist filter, truncation.
//!
//! Runs once per query after the queue has been joined. Everything here is
//! a pure function of the accumulated list and the configuration, so
//! applying it twice gives the same output as applying it once.

use std::collections::HashSet;

use crate::config::ScrapeConfig;
use crate::types::SearchResult;

/// Per-query cleanup applied to accumulated results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessor {
    blacklist: HashSet<String>,
    max_results: usize,
}

impl PostProcessor {
    /// Build a post-processor. Blacklist entries are lowercased and trimmed.
    pub fn new<I, S>(blacklist: I, max_results: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blacklist: blacklist
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            max_results,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(&config.blacklist, config.max_results_per_query)
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn is_blacklisted(&self, domain: &str) -> bool {
        self.blacklist.contains(domain)
    }

    /// Dedup by URL (first occurrence wins), drop blacklisted domains, then
    /// keep at most `max_results` entries in arrival order.
    pub fn apply(&self, results: &[SearchResult]) -> Vec<SearchResult> {
        let unique = dedup_by_url(results.to_vec());
        let mut kept = filter_blacklisted(unique, &self.blacklist);
        kept.truncate(self.max_results);
        kept
    }
}

/// Remove results whose URL was already seen, keeping the earliest.
///
/// URLs are compared exactly; no normalisation is applied.
pub fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}

/// Remove results whose domain is in `blacklist`.
pub fn filter_blacklisted(
    results: Vec<SearchResult>,
    blacklist: &HashSet<String>,
) -> Vec<SearchResult> {
    if blacklist.is_empty() {
        return results;
    }
    results
        .into_iter()
        .filter(|r| !blacklist.contains(&r.domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(url: &str, title: &str) -> SearchResult {
        SearchResult::new(title, url, format!("Snippet for {title}"))
    }

    #[test]
    fn unique_urls_pass_through() {
        let results = vec![
            make_result("https://a.com", "A"),
            make_result("https://b.com", "B"),
        ];
        assert_eq!(dedup_by_url(results).len(), 2);
    }

    #[test]
    fn first_occurrence_kept() {
        let results = vec![
            make_result("https://example.com/page", "first"),
            make_result("https://other.com", "other"),
            make_result("https://example.com/page", "second"),
        ];
        let deduped = dedup_by_url(results);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "first");
        assert_eq!(deduped[1].title, "other");
    }

    #[test]
    fn urls_compared_exactly() {
        let results = vec![
            make_result("https://example.com/page", "plain"),
            make_result("https://example.com/page/", "slash"),
        ];
        assert_eq!(dedup_by_url(results).len(), 2);
    }

    #[test]
    fn blacklisted_domains_removed() {
        let blacklist: HashSet<String> = ["spam.com".to_string()].into_iter().collect();
        let results = vec![
            make_result("http://spam.com/buy", "spam"),
            make_result("http://x.com/1", "x"),
        ];
        let kept = filter_blacklisted(results, &blacklist);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].domain, "x.com");
    }

    #[test]
    fn blacklist_matches_whole_domain_only() {
        let post = PostProcessor::new(["example.com"], 10);
        let results = vec![
            make_result("https://example.com/a", "bare"),
            make_result("https://www.example.com/b", "www"),
        ];
        let kept = post.apply(&results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].domain, "www.example.com");
    }

    #[test]
    fn duplicate_and_blacklisted_scenario() {
        let post = PostProcessor::new(["spam.com"], 10);
        let raw = vec![
            make_result("http://x.com/1", "one"),
            make_result("http://x.com/1", "one again"),
            make_result("http://spam.com/ad", "spam"),
        ];
        let out = post.apply(&raw);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://x.com/1");
        assert_eq!(out[0].domain, "x.com");
        assert_eq!(out[0].title, "one");
    }

    #[test]
    fn truncates_preserving_arrival_order() {
        let post = PostProcessor::new(Vec::<String>::new(), 2);
        let raw: Vec<SearchResult> = (0..5)
            .map(|i| make_result(&format!("https://site{i}.com"), &format!("r{i}")))
            .collect();
        let out = post.apply(&raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "r0");
        assert_eq!(out[1].title, "r1");
    }

    #[test]
    fn truncation_counts_after_dedup_and_filter() {
        let post = PostProcessor::new(["spam.com"], 2);
        let raw = vec![
            make_result("https://spam.com/1", "spam"),
            make_result("https://a.com", "a"),
            make_result("https://a.com", "a dup"),
            make_result("https://b.com", "b"),
            make_result("https://c.com", "c"),
        ];
        let titles: Vec<String> = post.apply(&raw).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn apply_is_idempotent() {
        let post = PostProcessor::new(["spam.com"], 3);
        let raw = vec![
            make_result("https://a.com", "a"),
            make_result("https://spam.com", "s"),
            make_result("https://a.com", "a2"),
            make_result("https://b.com", "b"),
            make_result("https://c.com", "c"),
            make_result("https://d.com", "d"),
        ];
        let once = post.apply(&raw);
        let twice = post.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn from_config_uses_blacklist_and_limit() {
        let config = ScrapeConfig {
            blacklist: vec!["Spam.com".into()],
            max_results_per_query: 7,
            ..Default::default()
        };
        let post = PostProcessor::from_config(&config);
        assert!(post.is_blacklisted("spam.com"));
        assert_eq!(post.max_results(), 7);
    }

    #[test]
    fn config_blacklist_is_trimmed_and_lowercased() {
        let config = ScrapeConfig {
            blacklist: vec![" Spam.COM ".into(), "".into(), "x.org".into()],
            ..Default::default()
        };
        let post = PostProcessor::from_config(&config);
        assert_eq!(post, PostProcessor::new(["spam.com", "x.org"], 10));
        assert!(!post.is_blacklisted(""));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let post = PostProcessor::new(["spam.com"], 5);
        assert!(post.apply(&[]).is_empty());
    }
}
