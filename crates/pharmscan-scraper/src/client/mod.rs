//! HTTP client that scrapes one pharmacy search page per call.

mod search_url;

use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use pharmscan_core::{AppConfig, RawCandidate, SourceConfig};
use rand::seq::IndexedRandom;
use reqwest::Client;

use crate::error::ScraperError;
use crate::extract::{DocumentExtractor, HtmlExtractor};
use crate::retry::retry_with_linear_backoff;

pub use search_url::build_search_url;
// Re-export for test visibility via `use super::*`
#[cfg(test)]
use search_url::extract_domain;

/// Characters left unescaped by JavaScript's `encodeURIComponent`; the search
/// pages expect their query segment encoded exactly that way.
pub const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Browser `User-Agent` strings rotated per request.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Timeout and retry policy for [`SourceClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// The wait before retry `n` is `n * retry_base_delay_ms`.
    pub retry_base_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 2,
            retry_base_delay_ms: 1000,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        }
    }
}

/// Fetches a source's search page and extracts raw candidates.
///
/// Network errors, timeouts and non-2xx statuses are retried with linear
/// backoff. The client never touches the result cache; callers decide what
/// to remember.
pub struct SourceClient {
    client: Client,
    settings: ClientSettings,
    extractor: Arc<dyn DocumentExtractor>,
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SourceClient {
    /// Creates a `SourceClient` using [`HtmlExtractor`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(settings: ClientSettings) -> Result<Self, ScraperError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;
        Ok(Self {
            client,
            settings,
            extractor: Arc::new(HtmlExtractor),
        })
    }

    /// Replaces the document extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Scrapes `source_name` for `query` and returns every raw candidate on
    /// the page.
    ///
    /// Disabled sources and sources missing a selector return `Ok(vec![])`
    /// without any network activity. A page where either selector matches
    /// nothing is also `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] / [`ScraperError::UnexpectedStatus`] — after
    ///   all retries are exhausted.
    /// - [`ScraperError::InvalidUrl`] / [`ScraperError::InvalidSelector`] —
    ///   immediately, without retrying.
    pub async fn fetch(
        &self,
        source_name: &str,
        config: &SourceConfig,
        query: &str,
    ) -> Result<Vec<RawCandidate>, ScraperError> {
        if !config.enabled {
            tracing::debug!(source = source_name, "skipping disabled source");
            return Ok(Vec::new());
        }
        if !config.has_selectors() {
            tracing::warn!(
                source = source_name,
                "source is enabled but missing name or price selector, skipping"
            );
            return Ok(Vec::new());
        }

        let url = build_search_url(config, query)?;
        let url = url.as_str();

        let outcome = retry_with_linear_backoff(
            self.settings.max_retries,
            self.settings.retry_base_delay_ms,
            move |attempt| self.fetch_once(source_name, config, url, attempt),
        )
        .await;

        if let Err(e) = &outcome {
            tracing::error!(
                source = source_name,
                query,
                error = %e,
                "giving up on source"
            );
        }
        outcome
    }

    async fn fetch_once(
        &self,
        source_name: &str,
        config: &SourceConfig,
        url: &str,
        attempt: u32,
    ) -> Result<Vec<RawCandidate>, ScraperError> {
        tracing::debug!(source = source_name, url, attempt, "requesting search page");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        let candidates = self.extractor.extract(&body, config)?;
        if candidates.is_empty() {
            tracing::warn!(
                source = source_name,
                host = %search_url::extract_domain(url),
                "no data found on page"
            );
        }
        Ok(candidates)
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
