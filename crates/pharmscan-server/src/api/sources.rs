use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct SourceItem {
    name: String,
    enabled: bool,
    usable: bool,
}

pub(super) async fn list_sources(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<SourceItem>>> {
    let data = state
        .search
        .registry()
        .load()
        .iter()
        .map(|(name, config)| SourceItem {
            name: name.clone(),
            enabled: config.enabled,
            usable: config.is_usable(),
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
