mod search;
mod sources;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pharmscan_scraper::PriceSearch;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<PriceSearch>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    sources: usize,
    cache_entries: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

fn search_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/search", get(search::search))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/sources", get(sources::list_sources));

    Router::new()
        .merge(public_routes)
        .merge(search_router(rate_limit))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let sources = state
        .search
        .registry()
        .load()
        .values()
        .filter(|config| config.is_usable())
        .count();
    let cache_entries = state.search.cache().len();

    if sources == 0 {
        tracing::warn!("health check: no usable sources configured");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    sources,
                    cache_entries,
                },
                meta,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                sources,
                cache_entries,
            },
            meta,
        }),
    )
}

async fn not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such route")
}

/// Each search fans out to every source, so the budget is kept modest.
pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pharmscan_core::{default_sources, SourceConfig, Sources};
    use pharmscan_scraper::{
        ClientSettings, ResultCache, SourceClient, SourceRegistry, DEFAULT_TTL,
    };
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_over(sources: Sources) -> Router {
        let client = SourceClient::new(ClientSettings {
            timeout_secs: 5,
            max_retries: 0,
            retry_base_delay_ms: 0,
        })
        .expect("client");
        let search = PriceSearch::new(
            SourceRegistry::from_sources(sources),
            client,
            ResultCache::new(DEFAULT_TTL),
        );
        build_app(
            AppState {
                search: Arc::new(search),
            },
            default_rate_limit_state(),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_unknown_code_maps_to_500() {
        let response = ApiError::new("req-1", "boom", "broken").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_usable_sources() {
        let (status, json) = get_json(app_over(default_sources()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["sources"].as_u64(), Some(4));
        assert_eq!(json["data"]["cache_entries"].as_u64(), Some(0));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn health_is_degraded_without_sources() {
        let (status, json) = get_json(app_over(Sources::new()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["data"]["status"], "degraded");
    }

    #[tokio::test]
    async fn sources_lists_registry_in_name_order() {
        let mut sources = default_sources();
        if let Some(netmeds) = sources.get_mut("Netmeds") {
            netmeds.enabled = false;
        }
        let (status, json) = get_json(app_over(sources), "/api/v1/sources").await;
        assert_eq!(status, StatusCode::OK);

        let data = json["data"].as_array().expect("data array");
        let names: Vec<&str> = data.iter().filter_map(|s| s["name"].as_str()).collect();
        assert_eq!(names, vec!["Netmeds", "PharmEasy", "Tata 1mg", "Truemeds"]);
        assert_eq!(data[0]["enabled"], false);
        assert_eq!(data[0]["usable"], false);
        assert_eq!(data[1]["usable"], true);
    }

    #[tokio::test]
    async fn search_without_query_is_bad_request() {
        for uri in ["/api/v1/search", "/api/v1/search?q=%20%20"] {
            let (status, json) = get_json(app_over(default_sources()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], "Please enter a medicine name to search.");
            assert!(json.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn search_without_sources_is_unavailable() {
        let (status, json) = get_json(app_over(Sources::new()), "/api/v1/search?q=crocin").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Platform configurations could not be loaded"));
    }

    #[tokio::test]
    async fn search_returns_matches_from_mock_pharmacy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/Dolo%20650"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<ul>
                    <li><span class="name">Dolo 650 Tablet</span><span class="price">Rs. 30.91</span></li>
                    <li><span class="name">Calpol 500</span><span class="price">Rs. 15.00</span></li>
                </ul>"#,
                "text/html",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let mut sources = Sources::new();
        sources.insert(
            "Mockmeds".to_string(),
            SourceConfig {
                url_template: format!("{}/search/{{query}}", server.uri()),
                name_selector: ".name".to_string(),
                price_selector: ".price".to_string(),
                link_selector: None,
                link_base_url: None,
                enabled: true,
            },
        );

        let (status, json) =
            get_json(app_over(sources), "/api/v1/search?q=Dolo%20650").await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["source_name"], "Mockmeds");
        assert_eq!(data[0]["matched_name"], "Dolo 650 Tablet");
        assert_eq!(data[0]["price"], "30.91");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_envelope() {
        let (status, json) = get_json(app_over(default_sources()), "/api/v1/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn request_id_header_flows_into_meta() {
        let response = app_over(default_sources())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sources")
                    .header("x-request-id", "trace-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.headers()["x-request-id"], "trace-abc");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["meta"]["request_id"], "trace-abc");
    }
}
