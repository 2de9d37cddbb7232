//! Two-stage filtering of raw candidates: approximate substring match for
//! recall, then case-insensitive containment for precision.

use std::sync::LazyLock;

use percent_encoding::utf8_percent_encode;
use pharmscan_core::{CandidateResult, RawCandidate};
use regex::Regex;

use crate::client::QUERY_COMPONENT;

/// Minimum normalized similarity (1.0 = identical) for a fuzzy hit.
///
/// Equivalent to a 0.3 distance tolerance: loose enough to survive
/// misspellings and dosage suffixes.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Display value for candidates without price text.
pub const MISSING_PRICE: &str = "N/A";

const THUMBNAIL_BASE: &str = "https://placehold.co/100x100.png?text=";

static RS_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rs\.?\s*").expect("valid rs prefix regex"));
static RUPEE_SIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹\s*").expect("valid rupee sign regex"));

/// Approximate-match index over candidate names.
#[derive(Debug)]
pub struct FuzzyIndex {
    names: Vec<String>,
}

impl FuzzyIndex {
    #[must_use]
    pub fn build(raw: &[RawCandidate]) -> Self {
        Self {
            names: raw.iter().map(|c| tokenize(&c.name).join(" ")).collect(),
        }
    }

    /// Similarity of candidate `index` to `query` in `0.0..=1.0`.
    ///
    /// The query is compared against every substring of the name with the
    /// same character length; the best one wins. A query found verbatim in
    /// the name scores 1.0. Names shorter than the query are compared whole.
    #[must_use]
    pub fn score(&self, index: usize, query: &str) -> f64 {
        let Some(name) = self.names.get(index) else {
            return 0.0;
        };
        let needle = tokenize(query).join(" ");
        if needle.is_empty() || name.is_empty() {
            return 0.0;
        }
        if name.contains(&needle) {
            return 1.0;
        }

        let chars: Vec<char> = name.chars().collect();
        let width = needle.chars().count();
        if chars.len() <= width {
            return strsim::normalized_levenshtein(name, &needle);
        }

        chars
            .windows(width)
            .map(|window| {
                let candidate: String = window.iter().collect();
                strsim::normalized_levenshtein(&candidate, &needle)
            })
            .fold(0.0, f64::max)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Keeps the raw candidates that plausibly are `query`, tagged with
/// `source_name` and a cleaned price.
///
/// A candidate survives when its fuzzy score reaches [`MATCH_THRESHOLD`] and
/// its name contains the query case-insensitively.
#[must_use]
pub fn reconcile(source_name: &str, query: &str, raw: &[RawCandidate]) -> Vec<CandidateResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let index = FuzzyIndex::build(raw);

    raw.iter()
        .enumerate()
        .filter(|(i, candidate)| {
            index.score(*i, &needle) >= MATCH_THRESHOLD
                && candidate.name.to_lowercase().contains(&needle)
        })
        .map(|(_, candidate)| CandidateResult {
            source_name: source_name.to_owned(),
            matched_name: candidate.name.clone(),
            price: clean_price(candidate.price.as_deref()),
            thumbnail_url: thumbnail_url(&candidate.name),
            product_url: candidate.link.clone(),
        })
        .collect()
}

/// Normalizes scraped price text for display.
///
/// Strips `Rs`/`Rs.` prefixes in any case, tightens `₹ 45` to `₹45` and
/// trims. Missing or empty text becomes [`MISSING_PRICE`].
#[must_use]
pub fn clean_price(price: Option<&str>) -> String {
    let Some(price) = price else {
        return MISSING_PRICE.to_owned();
    };
    let without_rs = RS_PREFIX_RE.replace_all(price, "");
    let cleaned = RUPEE_SIGN_RE.replace(&without_rs, "₹");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        MISSING_PRICE.to_owned()
    } else {
        cleaned.to_owned()
    }
}

fn thumbnail_url(name: &str) -> String {
    let label: String = name.chars().take(10).collect();
    format!(
        "{THUMBNAIL_BASE}{}",
        utf8_percent_encode(&label, QUERY_COMPONENT)
    )
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
