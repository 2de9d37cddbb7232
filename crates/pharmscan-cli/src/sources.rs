//! `sources` command: show which pharmacy sources a search would use.

use pharmscan_core::{load_sources_file, AppConfig, Sources};
use pharmscan_scraper::SourceRegistry;

/// Prints every configured source with its enabled/usable flags.
///
/// Without `strict`, an unreadable sources file falls back to the built-in
/// defaults exactly as a search would.
///
/// # Errors
///
/// With `strict`, returns an error if the sources file cannot be read,
/// parsed, or validated.
pub(crate) fn run_sources(config: &AppConfig, strict: bool) -> anyhow::Result<()> {
    let sources: Sources = if strict {
        load_sources_file(&config.sources_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to load sources from {}: {e}",
                config.sources_path.display()
            )
        })?
    } else {
        SourceRegistry::from_path(&config.sources_path).load().clone()
    };

    println!("{:<16}{:<9}{:<8}HOST", "NAME", "ENABLED", "USABLE");
    for (name, source) in &sources {
        println!(
            "{:<16}{:<9}{:<8}{}",
            name,
            yes_no(source.enabled),
            yes_no(source.is_usable()),
            host_of(&source.url_template)
        );
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Host part of a URL template, e.g. `www.netmeds.com`. Falls back to the
/// whole template when it does not parse.
fn host_of(url_template: &str) -> String {
    reqwest::Url::parse(url_template)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url_template.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_strips_scheme_and_path() {
        assert_eq!(
            host_of("https://www.netmeds.com/catalogsearch/result/{query}/all"),
            "www.netmeds.com"
        );
        assert_eq!(
            host_of("https://pharmeasy.in?name={query}"),
            "pharmeasy.in"
        );
        assert_eq!(host_of("no-scheme/{query}"), "no-scheme/{query}");
    }
}
