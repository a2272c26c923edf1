//! HTTP surface for Quran Search
//!
//! Thin axum layer over `quran_search_lib`: request parsing, status mapping
//! and middleware. All search semantics live in the core crate.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use quran_search_lib::state::DEFAULT_CACHE_CAPACITY;
use quran_search_lib::{
    default_dataset_path, AppState, ChapterSummary, QuranSearchError, SearchMode, SearchResponse,
    StateConfig, VerseMatches, DEFAULT_RESULT_CAP,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Routes take no request body.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

// === Configuration ===

#[derive(Parser, Debug, Clone)]
#[command(name = "quran-search-api", about = "Quran occurrence search server")]
pub struct Config {
    /// Path to the chapters/verses JSON dataset
    #[arg(long, env = "QURAN_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Expected SHA-256 of the dataset (hex, optional "sha256:" prefix)
    #[arg(long, env = "QURAN_DATASET_SHA256")]
    pub dataset_sha256: Option<String>,

    /// HTTP listening address
    #[arg(long, env = "QURAN_SEARCH_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Maximum number of verse results returned per search
    #[arg(long, env = "QURAN_RESULT_CAP", default_value_t = DEFAULT_RESULT_CAP)]
    pub result_cap: usize,

    /// Number of cached search responses (0 disables the cache)
    #[arg(long, env = "QURAN_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Report computed occurrence totals only
    #[arg(long, env = "QURAN_NO_COUNT_OVERRIDES")]
    pub no_count_overrides: bool,

    /// Per-client request rate; no limiting when unset
    #[arg(long, env = "QURAN_RATE_LIMIT_PER_SECOND")]
    pub rate_limit_per_second: Option<u64>,

    /// Burst allowance for the per-client rate limit
    #[arg(long, env = "QURAN_RATE_LIMIT_BURST", default_value_t = 20)]
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset.clone().unwrap_or_else(default_dataset_path)
    }

    pub fn state_config(&self) -> StateConfig {
        let mut config = StateConfig::new(self.dataset_path());
        config.dataset_sha256 = self.dataset_sha256.clone();
        config.result_cap = self.result_cap;
        config.cache_capacity = self.cache_capacity;
        config.count_overrides = !self.no_count_overrides;
        config
    }
}

// === State ===

/// Router state. Holds no corpus when startup loading failed; every data
/// route then answers 503 instead of serving partial results.
#[derive(Clone)]
pub struct ApiState {
    app: Option<Arc<AppState>>,
    load_error: Option<Arc<str>>,
}

impl ApiState {
    pub fn ready(app: AppState) -> Self {
        Self {
            app: Some(Arc::new(app)),
            load_error: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            app: None,
            load_error: Some(Arc::from(reason.into())),
        }
    }

    fn require_state(&self) -> Result<&AppState, ApiError> {
        self.app.as_deref().ok_or_else(|| {
            let reason = self.load_error.as_deref().unwrap_or("corpus not loaded");
            ApiError(QuranSearchError::CorpusNotReady(reason.to_string()))
        })
    }
}

// === Errors ===

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub QuranSearchError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            QuranSearchError::NotFound(_) => StatusCode::NOT_FOUND,
            QuranSearchError::CorpusNotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

/// Unwrap query parameters, reporting parse failures in the JSON error shape.
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(inner)| inner)
        .map_err(|rejection| ApiError(QuranSearchError::InvalidQuery(rejection.body_text())))
}

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    mode: Option<SearchMode>,
}

#[derive(Deserialize)]
struct VerseQuery {
    chapter: u32,
    verse: u32,
    q: Option<String>,
    mode: Option<SearchMode>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verses: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_cap: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// === Handlers ===

async fn health(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    match state.require_state() {
        Ok(app) => {
            let corpus = app.search_engine.corpus();
            let (cache_entries, cache_capacity) = app.search_cache.stats();
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ok",
                    chapters: Some(corpus.chapter_count()),
                    verses: Some(corpus.verse_count()),
                    loaded_at: Some(app.loaded_at),
                    result_cap: Some(app.search_engine.result_cap()),
                    cache_entries: Some(cache_entries),
                    cache_capacity: Some(cache_capacity),
                    error: None,
                }),
            )
        }
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                chapters: None,
                verses: None,
                loaded_at: None,
                result_cap: None,
                cache_entries: None,
                cache_capacity: None,
                error: state.load_error.as_deref().map(str::to_string),
            }),
        ),
    }
}

async fn search(
    State(state): State<ApiState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Arc<SearchResponse>>, ApiError> {
    let params = query_params(params)?;
    let app = state.require_state()?;
    let query = params.q.unwrap_or_default();
    let mode = params.mode.unwrap_or_default();

    let response = app.search_cache.get_or_search(&app.search_engine, &query, mode)?;
    Ok(Json(response))
}

async fn chapters(State(state): State<ApiState>) -> Result<Json<Vec<ChapterSummary>>, ApiError> {
    let app = state.require_state()?;
    Ok(Json(app.search_engine.corpus().summaries()))
}

async fn verse(
    State(state): State<ApiState>,
    params: Result<Query<VerseQuery>, QueryRejection>,
) -> Result<Json<VerseMatches>, ApiError> {
    let params = query_params(params)?;
    let app = state.require_state()?;
    let query = params.q.as_deref().filter(|q| !q.trim().is_empty());
    let mode = params.mode.unwrap_or_default();

    let found = app
        .search_engine
        .verse_matches(params.chapter, params.verse, query, mode)?;
    Ok(Json(found))
}

// === Router ===

pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/chapters", get(chapters))
        .route("/api/verse", get(verse))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Wrap `router` in a per-peer-IP limit of `per_second` requests per second
/// with `burst` requests of headroom.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` for the peer address
/// to be available.
pub fn with_rate_limit(router: Router, per_second: u64, burst: u32) -> anyhow::Result<Router> {
    if per_second == 0 {
        anyhow::bail!("rate limit must be at least one request per second");
    }
    // The governor replenishes one request per period.
    let period_ms = (1000 / per_second).max(1);
    let config = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("rate limit burst must be non-zero"))?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::try_parse_from(["quran-search-api", "--dataset", "/tmp/q.json"]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.result_cap, DEFAULT_RESULT_CAP);
        assert!(config.rate_limit_per_second.is_none());

        let state = config.state_config();
        assert_eq!(state.dataset_path, PathBuf::from("/tmp/q.json"));
        assert!(state.count_overrides);
    }

    #[test]
    fn test_config_flags() {
        let config = Config::try_parse_from([
            "quran-search-api",
            "--dataset",
            "/tmp/q.json",
            "--result-cap",
            "10",
            "--cache-capacity",
            "0",
            "--no-count-overrides",
        ])
        .unwrap();

        let state = config.state_config();
        assert_eq!(state.result_cap, 10);
        assert_eq!(state.cache_capacity, 0);
        assert!(!state.count_overrides);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError(QuranSearchError::MissingQuery).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(QuranSearchError::InvalidQuery("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError(QuranSearchError::NotFound("2:999".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError(QuranSearchError::CorpusNotReady("x".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError(QuranSearchError::CorpusLoad("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let router = build_router(ApiState::unavailable("test"));
        assert!(with_rate_limit(router.clone(), 0, 5).is_err());
        assert!(with_rate_limit(router.clone(), 5, 0).is_err());
        assert!(with_rate_limit(router, 50, 10).is_ok());
    }
}
