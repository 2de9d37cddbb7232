//! Memoized source registry with a built-in fallback.

use std::path::PathBuf;
use std::sync::OnceLock;

use pharmscan_core::{default_sources, load_sources_file, SourceConfig, Sources};

#[derive(Debug)]
enum Origin {
    File(PathBuf),
    Fixed(Sources),
}

/// Source name → configuration, loaded at most once per registry.
#[derive(Debug)]
pub struct SourceRegistry {
    origin: Origin,
    loaded: OnceLock<Sources>,
}

impl SourceRegistry {
    /// Registry backed by an external sources document. Reading is deferred
    /// to the first [`load`](Self::load).
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::File(path.into()),
            loaded: OnceLock::new(),
        }
    }

    /// Registry over a fixed mapping; no file is read and no fallback applies.
    #[must_use]
    pub fn from_sources(sources: Sources) -> Self {
        Self {
            origin: Origin::Fixed(sources),
            loaded: OnceLock::new(),
        }
    }

    /// Returns the sources, reading the document on first call.
    ///
    /// Any read, parse or validation failure is logged and replaced by
    /// [`default_sources`]; this never fails.
    pub fn load(&self) -> &Sources {
        self.loaded.get_or_init(|| match &self.origin {
            Origin::Fixed(sources) => sources.clone(),
            Origin::File(path) => match load_sources_file(path) {
                Ok(sources) => {
                    tracing::info!(
                        path = %path.display(),
                        count = sources.len(),
                        "loaded source configurations"
                    );
                    sources
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "using default source configurations"
                    );
                    default_sources()
                }
            },
        })
    }

    /// Enabled sources in registry order.
    pub fn enabled(&self) -> impl Iterator<Item = (&str, &SourceConfig)> {
        self.load()
            .iter()
            .filter(|(_, config)| config.enabled)
            .map(|(name, config)| (name.as_str(), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(enabled: bool) -> SourceConfig {
        SourceConfig {
            url_template: "https://pharmacy.test/{query}".to_owned(),
            name_selector: ".n".to_owned(),
            price_selector: ".p".to_owned(),
            link_selector: None,
            link_base_url: None,
            enabled,
        }
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let registry = SourceRegistry::from_path("/definitely/not/here/platforms.json");
        let sources = registry.load();
        assert!(!sources.is_empty());
        assert_eq!(sources, &default_sources());
    }

    #[test]
    fn load_is_memoized() {
        let registry = SourceRegistry::from_path("/definitely/not/here/platforms.json");
        let first: *const Sources = registry.load();
        let second: *const Sources = registry.load();
        assert_eq!(first, second);
    }

    #[test]
    fn valid_file_replaces_defaults() {
        let dir = std::env::temp_dir().join(format!("pharmscan-registry-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("platforms.json");
        std::fs::write(
            &path,
            r#"{"Solo": {"url_template": "https://solo.test/{query}", "name_selector": ".n", "price_selector": ".p"}}"#,
        )
        .unwrap();

        let registry = SourceRegistry::from_path(&path);
        let names: Vec<&str> = registry.load().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Solo"]);
    }

    #[test]
    fn fixed_empty_mapping_stays_empty() {
        let registry = SourceRegistry::from_sources(Sources::new());
        assert!(registry.load().is_empty());
    }

    #[test]
    fn enabled_skips_disabled_sources_in_order() {
        let mut sources = Sources::new();
        sources.insert("Charlie".to_owned(), source(true));
        sources.insert("Alpha".to_owned(), source(true));
        sources.insert("Bravo".to_owned(), source(false));
        let registry = SourceRegistry::from_sources(sources);
        let names: Vec<&str> = registry.enabled().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Alpha", "Charlie"]);
    }
}
