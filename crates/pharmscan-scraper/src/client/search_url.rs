//! Search URL construction and host extraction for the source client.

use percent_encoding::utf8_percent_encode;
use pharmscan_core::SourceConfig;

use super::QUERY_COMPONENT;
use crate::error::ScraperError;

/// Builds the search URL for `query` from the source's template.
///
/// The trimmed query is percent-encoded with [`QUERY_COMPONENT`] before
/// substitution.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the rendered template is not an
/// absolute URL.
pub fn build_search_url(config: &SourceConfig, query: &str) -> Result<String, ScraperError> {
    let encoded = utf8_percent_encode(query.trim(), QUERY_COMPONENT).to_string();
    let rendered = config.render_url(&encoded);
    reqwest::Url::parse(&rendered).map_err(|e| ScraperError::InvalidUrl {
        url: rendered.clone(),
        reason: e.to_string(),
    })?;
    Ok(rendered)
}

/// Extracts the hostname from a URL for log fields.
///
/// Falls back to the full URL string if parsing fails.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
