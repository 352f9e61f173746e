//! Shared per-run result store.
//!
//! Agents record the results for each query they process; the pool takes
//! the accumulated map once the queue has been joined. Lists keep arrival
//! order, which the post-processor relies on for first-occurrence dedup.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{Query, SearchResult};

/// Synchronized mapping from query to accumulated results.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<HashMap<Query, Vec<SearchResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Query, Vec<SearchResult>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `results` to the list for `query`, creating the entry if
    /// needed. An empty `results` still creates the key.
    pub fn record(&self, query: &str, results: Vec<SearchResult>) {
        let mut map = self.lock();
        match map.get_mut(query) {
            Some(existing) => existing.extend(results),
            None => {
                map.insert(query.to_string(), results);
            }
        }
    }

    /// Snapshot of the results recorded for `query`.
    pub fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        self.lock().get(query).cloned()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.lock().contains_key(query)
    }

    /// Number of queries with a recorded entry.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Move the accumulated map out, leaving the store empty.
    pub fn take(&self) -> HashMap<Query, Vec<SearchResult>> {
        std::mem::take(&mut *self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn result(url: &str) -> SearchResult {
        SearchResult::new("t", url, "s")
    }

    #[test]
    fn record_creates_and_appends_in_order() {
        let store = ResultStore::new();
        store.record("q", vec![result("https://a.com/1")]);
        store.record("q", vec![result("https://a.com/2"), result("https://a.com/3")]);

        let urls: Vec<String> = store
            .get("q")
            .expect("entry")
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, ["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
    }

    #[test]
    fn empty_record_creates_key() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        store.record("nothing", vec![]);
        assert!(store.contains("nothing"));
        assert_eq!(store.get("nothing"), Some(vec![]));
    }

    #[test]
    fn take_empties_store() {
        let store = ResultStore::new();
        store.record("a", vec![result("https://a.com")]);
        store.record("b", vec![]);

        let map = store.take();
        assert_eq!(map.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_writers_to_distinct_keys() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.record(&format!("q{i}"), vec![result(&format!("https://h{i}.com"))]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(store.len(), 8);
    }
}
