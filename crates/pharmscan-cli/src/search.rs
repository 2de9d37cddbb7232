//! `search` command: run one price search and print the merged results.

use std::cmp::Ordering;

use pharmscan_core::{AppConfig, CandidateResult};
use pharmscan_scraper::PriceSearch;

const NAME_WIDTH: usize = 44;

/// Searches every enabled source for `term` and prints a table, or the wire
/// JSON when `json` is set.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, or if the search
/// itself fails (blank term, no sources configured).
pub(crate) async fn run_search(
    config: &AppConfig,
    term: &str,
    sort_price: bool,
    json: bool,
) -> anyhow::Result<()> {
    let search = PriceSearch::from_app_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build source client: {e}"))?;

    let mut response = search.search_pharmacies(term).await;
    if sort_price {
        if let Some(data) = response.data.as_mut() {
            sort_by_price(data);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let Some(results) = response.data else {
        anyhow::bail!(
            "{}",
            response
                .error
                .unwrap_or_else(|| "search failed".to_string())
        );
    };

    if results.is_empty() {
        println!("{}", response.error.unwrap_or_default());
        return Ok(());
    }

    println!(
        "{:<14}{:<12}{:<NAME_WIDTH$}LINK",
        "SOURCE", "PRICE", "NAME"
    );
    for result in &results {
        println!(
            "{:<14}{:<12}{:<NAME_WIDTH$}{}",
            result.source_name,
            result.price,
            truncate(&result.matched_name, NAME_WIDTH - 2),
            result.product_url.as_deref().unwrap_or("\u{2014}")
        );
    }
    println!("\n{} result(s) for \"{}\"", results.len(), term.trim());

    Ok(())
}

/// Stable sort by numeric price; listings without a parseable price go last
/// in their original order.
pub(crate) fn sort_by_price(results: &mut [CandidateResult]) {
    results.sort_by(|a, b| match (a.price_value(), b.price_value()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
