//! In-memory TTL cache of per-source search results.
//!
//! Keys are `(source name, normalized query)`. Entries are overwritten on
//! every fetch attempt and treated as absent once `now - fetched_at >= ttl`.
//! Nothing is persisted; a restart starts cold.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pharmscan_core::CandidateResult;

/// Default lifetime of a cache entry: 3 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Time source for cache stamps, injectable for tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub results: Vec<CandidateResult>,
    pub fetched_at: DateTime<Utc>,
    /// `true` when the entry records a fetch that exhausted its retries.
    /// Reads treat it exactly like an empty result set.
    pub failed: bool,
}

type CacheKey = (String, String);

/// Thread-safe TTL cache shared by all in-flight source tasks.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    /// Cache key component for a search term: trimmed and lower-cased.
    #[must_use]
    pub fn normalize_query(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Returns the entry for `(source, query)` unless it is missing or expired.
    #[must_use]
    pub fn get(&self, source: &str, query: &str) -> Option<CacheEntry> {
        let key = (source.to_owned(), Self::normalize_query(query));
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&key)
            .filter(|entry| self.is_fresh(entry, now))
            .cloned()
    }

    /// Stores `results` for `(source, query)`, replacing any previous entry.
    pub fn put(&self, source: &str, query: &str, results: Vec<CandidateResult>) {
        self.insert(source, query, results, false);
    }

    /// Records an exhausted-retry failure as an empty result set so the
    /// same pair is not hammered again within the TTL.
    pub fn put_failure(&self, source: &str, query: &str) {
        self.insert(source, query, Vec::new(), true);
    }

    fn insert(&self, source: &str, query: &str, results: Vec<CandidateResult>, failed: bool) {
        let key = (source.to_owned(), Self::normalize_query(query));
        let entry = CacheEntry {
            results,
            fetched_at: self.clock.now(),
            failed,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.fetched_at) < self.ttl
    }
}
