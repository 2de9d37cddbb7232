use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An unfiltered (name, price) pair pulled out of a source's search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub name: String,
    /// Price text exactly as it appeared on the page; `None` when the
    /// matched price node had no text.
    pub price: Option<String>,
    /// Product page link, already resolved against the source's base URL.
    pub link: Option<String>,
}

/// A search hit from one pharmacy that passed reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Registry name of the source, e.g. `"Tata 1mg"`.
    pub source_name: String,
    /// Product name as the pharmacy displays it.
    pub matched_name: String,
    /// Cleaned display price, e.g. `"₹45.00"`, or `"N/A"`.
    pub price: String,
    /// Placeholder image reference; display only.
    pub thumbnail_url: String,
    pub product_url: Option<String>,
}

impl CandidateResult {
    /// Numeric part of the display price, if any.
    ///
    /// Currency symbols, thousands separators and trailing units are ignored:
    /// `"₹1,045.50"` → `1045.50`. Returns `None` for `"N/A"`.
    #[must_use]
    pub fn price_value(&self) -> Option<Decimal> {
        let numeric: String = self
            .price
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .filter(|c| *c != ',')
            .collect();
        if numeric.is_empty() {
            return None;
        }
        Decimal::from_str(numeric.trim_end_matches('.')).ok()
    }
}
