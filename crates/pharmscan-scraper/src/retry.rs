//! Retry utilities for per-source scrape requests.
//!
//! Transient failures (network errors, timeouts, non-2xx responses) are
//! retried with a linearly growing delay. Configuration problems such as an
//! unparsable URL or selector are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is worth retrying after a backoff delay.
///
/// Retriable:
/// - [`ScraperError::Http`] — connection failure, timeout, body read error.
/// - [`ScraperError::UnexpectedStatus`] — any non-2xx; pharmacy sites
///   intermittently answer bot traffic with 403/503.
///
/// Not retriable:
/// - [`ScraperError::InvalidUrl`] and [`ScraperError::InvalidSelector`] —
///   the source configuration is wrong and will stay wrong.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. }
    )
}

/// Delay before retry number `retry` (1-based): `retry * base_delay_ms`.
pub(crate) fn backoff_delay(retry: u32, base_delay_ms: u64) -> Duration {
    Duration::from_millis(base_delay_ms.saturating_mul(u64::from(retry)))
}

/// Executes `operation` with linear backoff retries on transient errors.
///
/// The operation receives the 1-based attempt number. On a retriable error it
/// is attempted again, up to `max_retries` additional times, sleeping
/// [`backoff_delay`] in between. The last error is returned once retries are
/// exhausted; non-retriable errors are returned immediately.
///
/// | Attempt | Sleep before it (`base_delay_ms = 1000`) |
/// |---------|------------------------------------------|
/// | 1       | —                                        |
/// | 2       | 1 s                                      |
/// | 3       | 2 s                                      |
///
/// With `max_retries = 2` the operation runs at most 3 times.
pub(crate) async fn retry_with_linear_backoff<T, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;

    loop {
        let err = match operation(retry + 1).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || retry >= max_retries {
            return Err(err);
        }

        retry += 1;
        let delay = backoff_delay(retry, base_delay_ms);
        tracing::warn!(
            attempt = retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient source error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
