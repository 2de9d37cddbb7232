use std::path::PathBuf;

use super::*;

/// Writes `content` to a per-test file under the system temp dir.
fn write_temp(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pharmscan-core-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write temp file");
    path
}

fn source(name_selector: &str, price_selector: &str, enabled: bool) -> SourceConfig {
    SourceConfig {
        url_template: "https://example.com/search?q={query}".to_string(),
        name_selector: name_selector.to_string(),
        price_selector: price_selector.to_string(),
        link_selector: None,
        link_base_url: None,
        enabled,
    }
}

#[test]
fn default_sources_cover_four_pharmacies() {
    let sources = default_sources();
    assert_eq!(sources.len(), 4);
    for name in ["Truemeds", "PharmEasy", "Tata 1mg", "Netmeds"] {
        let config = sources.get(name).expect("default source present");
        assert!(config.is_usable(), "{name} should be usable");
        assert!(config.url_template.contains(QUERY_PLACEHOLDER));
    }
}

#[test]
fn is_usable_requires_enabled_and_selectors() {
    assert!(source(".name", ".price", true).is_usable());
    assert!(!source(".name", ".price", false).is_usable());
    assert!(!source("", ".price", true).is_usable());
    assert!(!source(".name", "   ", true).is_usable());
}

#[test]
fn render_url_substitutes_both_placeholders() {
    let current = source(".n", ".p", true);
    assert_eq!(
        current.render_url("dolo%20650"),
        "https://example.com/search?q=dolo%20650"
    );

    let mut legacy = source(".n", ".p", true);
    legacy.url_template = "https://example.com/search/{medicine}/all".to_string();
    assert_eq!(
        legacy.render_url("crocin"),
        "https://example.com/search/crocin/all"
    );
}

#[test]
fn load_sources_file_reads_json() {
    let path = write_temp(
        "sources.json",
        r#"{
            "Alpha": {
                "url_template": "https://alpha.test/s?q={query}",
                "name_selector": ".name",
                "price_selector": ".price",
                "enabled": true
            }
        }"#,
    );
    let sources = load_sources_file(&path).unwrap();
    let alpha = sources.get("Alpha").unwrap();
    assert_eq!(alpha.name_selector, ".name");
    assert!(alpha.link_selector.is_none());
}

#[test]
fn load_sources_file_accepts_legacy_keys() {
    let path = write_temp(
        "platforms.json",
        r#"{
            "Netmeds": {
                "urlTemplate": "https://www.netmeds.com/catalogsearch/result/{medicine}/all",
                "nameClass": ".clsgetname",
                "priceClass": ".final-price",
                "linkSelector": "a.category_name",
                "linkBaseUrl": "https://www.netmeds.com",
                "enabled": false
            }
        }"#,
    );
    let sources = load_sources_file(&path).unwrap();
    let netmeds = sources.get("Netmeds").unwrap();
    assert_eq!(netmeds.name_selector, ".clsgetname");
    assert_eq!(netmeds.price_selector, ".final-price");
    assert_eq!(netmeds.link_selector.as_deref(), Some("a.category_name"));
    assert_eq!(
        netmeds.link_base_url.as_deref(),
        Some("https://www.netmeds.com")
    );
    assert!(!netmeds.enabled);
}

#[test]
fn load_sources_file_reads_yaml() {
    let path = write_temp(
        "sources.yaml",
        "Beta:\n  url_template: \"https://beta.test/{query}\"\n  name_selector: \".n\"\n  price_selector: \".p\"\n",
    );
    let sources = load_sources_file(&path).unwrap();
    let beta = sources.get("Beta").unwrap();
    assert!(beta.enabled, "enabled defaults to true");
    assert_eq!(beta.url_template, "https://beta.test/{query}");
}

#[test]
fn load_sources_file_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("pharmscan-core-does-not-exist.json");
    let err = load_sources_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::SourcesFileIo { .. }), "got: {err:?}");
}

#[test]
fn load_sources_file_malformed_json_is_parse_error() {
    let path = write_temp("broken.json", "{ not json");
    let err = load_sources_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::SourcesFileJson(_)), "got: {err:?}");
}

#[test]
fn load_sources_file_rejects_empty_mapping() {
    let path = write_temp("empty.json", "{}");
    let err = load_sources_file(&path).unwrap_err();
    assert!(err.to_string().contains("no sources"));
}

#[test]
fn validate_rejects_blank_name() {
    let mut sources = Sources::new();
    sources.insert("  ".to_string(), source(".n", ".p", true));
    let err = validate_sources(&sources).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_empty_url_template() {
    let mut sources = Sources::new();
    let mut config = source(".n", ".p", true);
    config.url_template = String::new();
    sources.insert("Gamma".to_string(), config);
    let err = validate_sources(&sources).unwrap_err();
    assert!(err.to_string().contains("Gamma"));
}

#[test]
fn validate_keeps_sources_with_blank_selectors() {
    // Selector problems are a per-source skip at search time, not a file error.
    let mut sources = Sources::new();
    sources.insert("Delta".to_string(), source("", "", true));
    assert!(validate_sources(&sources).is_ok());
}

#[test]
fn checked_in_platforms_file_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("platforms.json");
    assert!(path.exists(), "platforms.json missing at {path:?}");
    let sources = load_sources_file(&path).expect("failed to load platforms.json");
    assert_eq!(sources, default_sources());
}
