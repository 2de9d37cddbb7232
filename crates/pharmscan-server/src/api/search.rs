use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use pharmscan_scraper::{SearchError, SearchResponse};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    #[serde(default)]
    q: String,
}

/// `GET /api/v1/search?q=<term>`: the `{data?, error?}` body is returned
/// unchanged; the status code tells apart the failure kinds.
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<SearchResponse>) {
    let result = state.search.search(&params.q).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(SearchError::EmptyQuery) => StatusCode::BAD_REQUEST,
        Err(SearchError::NoSourcesConfigured) => StatusCode::SERVICE_UNAVAILABLE,
        Err(SearchError::Unexpected(detail)) => {
            tracing::error!(request_id = %req_id.0, detail = %detail, "search failed unexpectedly");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if let Ok(outcome) = &result {
        tracing::info!(
            request_id = %req_id.0,
            query = %params.q.trim(),
            results = outcome.results.len(),
            "search served"
        );
    }

    (status, Json(SearchResponse::from(result)))
}
