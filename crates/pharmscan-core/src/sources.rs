use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder substituted with the percent-encoded search term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Placeholder used by older `platforms.json` files; treated like `{query}`.
pub const LEGACY_QUERY_PLACEHOLDER: &str = "{medicine}";

/// Source name → scrape configuration. Iteration order is the registry order.
pub type Sources = BTreeMap<String, SourceConfig>;

/// Scrape configuration for a single pharmacy website.
///
/// The camelCase keys of the legacy `platforms.json` format (`urlTemplate`,
/// `nameClass`, `priceClass`, `linkSelector`, `linkBaseUrl`) are accepted as
/// aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(alias = "urlTemplate")]
    pub url_template: String,
    #[serde(default, alias = "nameClass", alias = "nameSelector")]
    pub name_selector: String,
    #[serde(default, alias = "priceClass", alias = "priceSelector")]
    pub price_selector: String,
    /// Selector whose `href` attribute points at the product page.
    #[serde(default, alias = "linkSelector")]
    pub link_selector: Option<String>,
    /// Base URL that relative product links are joined onto.
    #[serde(default, alias = "linkBaseUrl")]
    pub link_base_url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SourceConfig {
    /// Returns `true` when both extraction selectors are non-blank.
    #[must_use]
    pub fn has_selectors(&self) -> bool {
        !self.name_selector.trim().is_empty() && !self.price_selector.trim().is_empty()
    }

    /// Returns `true` if the source is enabled and satisfies the selector
    /// invariant. Unusable sources are skipped, never failed.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.enabled && self.has_selectors()
    }

    /// Substitutes an already percent-encoded query into the URL template.
    #[must_use]
    pub fn render_url(&self, encoded_query: &str) -> String {
        self.url_template
            .replace(QUERY_PLACEHOLDER, encoded_query)
            .replace(LEGACY_QUERY_PLACEHOLDER, encoded_query)
    }
}

/// Built-in source set used when the external document cannot be loaded.
#[must_use]
pub fn default_sources() -> Sources {
    let entry = |url: &str, name: &str, price: &str| SourceConfig {
        url_template: url.to_string(),
        name_selector: name.to_string(),
        price_selector: price.to_string(),
        link_selector: None,
        link_base_url: None,
        enabled: true,
    };

    let mut sources = Sources::new();
    sources.insert(
        "Truemeds".to_string(),
        entry(
            "https://www.truemeds.in/search/{query}",
            ".sc-a39eeb4f-12.daYLth",
            ".sc-a39eeb4f-17.iwZSqt",
        ),
    );
    sources.insert(
        "PharmEasy".to_string(),
        entry(
            "https://pharmeasy.in/search/all?name={query}",
            ".ProductCard_medicineName__Uzjm7",
            ".ProductCard_unitPriceDecimal__Ur26V",
        ),
    );
    sources.insert(
        "Tata 1mg".to_string(),
        entry(
            "https://www.1mg.com/search/all?filter=true&name={query}",
            ".style__pro-title___3G3rr",
            ".style__price-tag___KzOkY",
        ),
    );
    sources.insert(
        "Netmeds".to_string(),
        entry(
            "https://www.netmeds.com/catalogsearch/result/{query}/all",
            ".clsgetname",
            ".final-price",
        ),
    );
    sources
}

/// Load and validate a sources document.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML; everything else is
/// parsed as JSON.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources_file(path: &Path) -> Result<Sources, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let sources: Sources = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_sources(&sources)?;

    Ok(sources)
}

fn validate_sources(sources: &Sources) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "sources file defines no sources".to_string(),
        ));
    }

    for (name, config) in sources {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }
        if config.url_template.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has an empty url_template"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
