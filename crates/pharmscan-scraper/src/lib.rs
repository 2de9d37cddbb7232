pub mod cache;
pub mod client;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod registry;
mod retry;
pub mod search;

pub use cache::{CacheEntry, Clock, ResultCache, SystemClock, DEFAULT_TTL};
pub use client::{build_search_url, ClientSettings, SourceClient};
pub use error::{ScraperError, SearchError};
pub use extract::{DocumentExtractor, HtmlExtractor};
pub use reconcile::{clean_price, reconcile};
pub use registry::SourceRegistry;
pub use search::{PriceSearch, SearchOutcome, SearchResponse, DEFAULT_MAX_CONCURRENT};
