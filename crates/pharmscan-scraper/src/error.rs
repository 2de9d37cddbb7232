use thiserror::Error;

/// Failures of a single request to a single source.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Hard failures of a whole search. `Display` yields the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please enter a medicine name to search.")]
    EmptyQuery,

    #[error(
        "Platform configurations could not be loaded. Please check server logs or platforms.json."
    )]
    NoSourcesConfigured,

    #[error("An unexpected error occurred during the search. Please try again.")]
    Unexpected(String),
}
