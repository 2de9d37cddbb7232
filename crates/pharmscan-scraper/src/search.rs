//! Fan-out orchestration of a price search across every enabled source.
//!
//! Each source is an independent unit of work: cache lookup, fetch on miss,
//! reconcile, cache store. Per-source failures are contained and become an
//! empty contribution; only validation and configuration problems fail the
//! whole search.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pharmscan_core::{AppConfig, CandidateResult, SourceConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::cache::ResultCache;
use crate::client::{ClientSettings, SourceClient};
use crate::error::{ScraperError, SearchError};
use crate::reconcile::reconcile;
use crate::registry::SourceRegistry;

/// Default cap on concurrently scraped sources.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// A successful search. `results` may be empty, in which case `diagnostic`
/// explains why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<CandidateResult>,
    pub diagnostic: Option<String>,
}

/// Wire shape of a search: `{data?, error?}`.
///
/// An empty success carries both `data: []` and an explanatory `error`, so
/// callers must check `data` rather than treat `error` as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<CandidateResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SearchOutcome, SearchError>> for SearchResponse {
    fn from(result: Result<SearchOutcome, SearchError>) -> Self {
        match result {
            Ok(outcome) => Self {
                data: Some(outcome.results),
                error: outcome.diagnostic,
            },
            Err(e) => Self {
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

enum Contribution {
    Cached(Vec<CandidateResult>),
    Fetching {
        source: String,
        handle: JoinHandle<Vec<CandidateResult>>,
    },
}

/// Concurrent multi-pharmacy price search.
///
/// Owns its [`ResultCache`]; spawned source tasks share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct PriceSearch {
    registry: Arc<SourceRegistry>,
    client: Arc<SourceClient>,
    cache: Arc<ResultCache>,
    max_concurrent: usize,
}

impl PriceSearch {
    #[must_use]
    pub fn new(registry: SourceRegistry, client: SourceClient, cache: ResultCache) -> Self {
        Self {
            registry: Arc::new(registry),
            client: Arc::new(client),
            cache: Arc::new(cache),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Wires registry, client and cache from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = SourceClient::new(ClientSettings::from_app_config(config))?;
        let cache = ResultCache::new(Duration::from_secs(config.cache_ttl_secs));
        let registry = SourceRegistry::from_path(&config.sources_path);
        Ok(Self::new(registry, client, cache).with_max_concurrent(config.max_concurrent_sources))
    }

    /// Caps how many sources are fetched at the same time (minimum 1).
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Searches every enabled source for `query` and merges the matches in
    /// registry order.
    ///
    /// # Errors
    ///
    /// - [`SearchError::EmptyQuery`] — blank input; nothing is fetched.
    /// - [`SearchError::NoSourcesConfigured`] — the registry is empty.
    /// - [`SearchError::Unexpected`] — the fan-out itself broke down.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let term = query.trim();
        if term.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        tracing::info!(query = term, "starting pharmacy search");

        let sources = self.registry.load();
        if sources.is_empty() {
            tracing::error!("no sources configured, aborting search");
            return Err(SearchError::NoSourcesConfigured);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut contributions = Vec::with_capacity(sources.len());

        for (name, config) in sources {
            if !config.enabled {
                tracing::debug!(source = %name, "skipping disabled source");
                continue;
            }
            if !config.has_selectors() {
                tracing::warn!(
                    source = %name,
                    "source is enabled but missing name or price selector, skipping"
                );
                continue;
            }

            if let Some(entry) = self.cache.get(name, term) {
                tracing::info!(
                    source = %name,
                    query = term,
                    results = entry.results.len(),
                    failed = entry.failed,
                    "cache hit"
                );
                contributions.push(Contribution::Cached(entry.results));
                continue;
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| SearchError::Unexpected(e.to_string()))?;
            let handle = tokio::spawn(scrape_source(
                Arc::clone(&self.client),
                Arc::clone(&self.cache),
                name.clone(),
                config.clone(),
                term.to_owned(),
                permit,
            ));
            contributions.push(Contribution::Fetching {
                source: name.clone(),
                handle,
            });
        }

        let merged = join_all(contributions.into_iter().map(|contribution| async move {
            match contribution {
                Contribution::Cached(results) => results,
                Contribution::Fetching { source, handle } => handle.await.unwrap_or_else(|e| {
                    tracing::error!(
                        source = %source,
                        error = %e,
                        "source task failed unexpectedly"
                    );
                    Vec::new()
                }),
            }
        }))
        .await;

        let results: Vec<CandidateResult> = merged.into_iter().flatten().collect();
        tracing::info!(query = term, total = results.len(), "pharmacy search finished");

        let diagnostic = results.is_empty().then(|| {
            format!(
                "No results found for \"{term}\" across all enabled platforms. This could be due to \
                 outdated selectors in platforms.json, network issues, or the medicine not being \
                 listed. Check server logs for detailed scraping attempts per platform."
            )
        });

        Ok(SearchOutcome {
            results,
            diagnostic,
        })
    }

    /// [`search`](Self::search) folded into the `{data?, error?}` wire shape.
    pub async fn search_pharmacies(&self, term: &str) -> SearchResponse {
        self.search(term).await.into()
    }
}

/// Fetch, reconcile and cache one source. Never fails: errors are logged,
/// cached as an empty result, and contribute nothing.
async fn scrape_source(
    client: Arc<SourceClient>,
    cache: Arc<ResultCache>,
    source: String,
    config: SourceConfig,
    query: String,
    _permit: OwnedSemaphorePermit,
) -> Vec<CandidateResult> {
    tracing::info!(source = %source, query = %query, "cache miss, scraping");

    match client.fetch(&source, &config, &query).await {
        Ok(raw) => {
            let results = reconcile(&source, &query, &raw);
            tracing::info!(
                source = %source,
                candidates = raw.len(),
                matched = results.len(),
                "source reconciled"
            );
            cache.put(&source, &query, results.clone());
            results
        }
        Err(e) => {
            tracing::warn!(
                source = %source,
                query = %query,
                error = %e,
                "source failed, caching empty result"
            );
            cache.put_failure(&source, &query);
            Vec::new()
        }
    }
}
