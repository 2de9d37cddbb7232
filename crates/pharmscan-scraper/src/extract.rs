//! Selector-driven extraction of raw candidates from a fetched page.
//!
//! The orchestration code only sees [`DocumentExtractor`]; the HTML parser
//! behind [`HtmlExtractor`] can be swapped without touching it.

use pharmscan_core::{RawCandidate, SourceConfig};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Turns a response body into raw (name, price, link) candidates using the
/// selectors of a [`SourceConfig`].
pub trait DocumentExtractor: Send + Sync {
    /// Returns an empty list when either selector matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a selector cannot be parsed.
    fn extract(
        &self,
        body: &str,
        config: &SourceConfig,
    ) -> Result<Vec<RawCandidate>, ScraperError>;
}

/// [`DocumentExtractor`] backed by the `scraper` crate's CSS selector engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl DocumentExtractor for HtmlExtractor {
    fn extract(
        &self,
        body: &str,
        config: &SourceConfig,
    ) -> Result<Vec<RawCandidate>, ScraperError> {
        let name_selector = parse_selector(&config.name_selector)?;
        let price_selector = parse_selector(&config.price_selector)?;
        let link_selector = config
            .link_selector
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_selector)
            .transpose()?;

        let document = Html::parse_document(body);

        let names: Vec<String> = document.select(&name_selector).map(element_text).collect();
        let prices: Vec<String> = document
            .select(&price_selector)
            .map(element_text)
            .collect();

        if names.is_empty() || prices.is_empty() {
            return Ok(Vec::new());
        }

        let links: Vec<Option<String>> = match &link_selector {
            Some(selector) => document
                .select(selector)
                .map(|el| element_href(el).and_then(|href| resolve_link(&href, config)))
                .collect(),
            None => Vec::new(),
        };

        // Paired by price-node index; a missing name stays empty.
        let candidates = prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| RawCandidate {
                name: names.get(i).cloned().unwrap_or_default(),
                price: Some(price).filter(|p| !p.is_empty()),
                link: links.get(i).cloned().flatten(),
            })
            .collect();

        Ok(candidates)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Visible text of an element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `href` of the element itself, or of its first descendant anchor.
fn element_href(element: ElementRef<'_>) -> Option<String> {
    if let Some(href) = element.value().attr("href") {
        return Some(href.to_owned());
    }
    let anchor = Selector::parse("a[href]").ok()?;
    element
        .select(&anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_owned)
}

/// Absolute product URL for `href`, joining relative paths onto
/// `link_base_url`. Relative links without a base are dropped.
fn resolve_link(href: &str, config: &SourceConfig) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    let base = Url::parse(config.link_base_url.as_deref()?).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
