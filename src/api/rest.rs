// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The dashboard front-end is served
// elsewhere, so CORS is permissive.
//
// Request failures never escape as panics: the dashboard handler converts any
// fetch or computation error into a single JSON error with a retry hint and
// an error id that can be matched against the server log.
// =============================================================================

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::report::build_report;
use crate::types::{Interval, ParseSelectionError, Period, Selection, Ticker};

/// Shown with every upstream failure.
pub const RETRY_HINT: &str = "Check your network connection or try again later.";

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/cache", delete(clear_cache))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    cached_entries: usize,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        cached_entries: state.fetcher.cache().fresh_len(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Options
// =============================================================================

async fn options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "tickers": Ticker::allowed(),
        "periods": Period::allowed(),
        "intervals": Interval::allowed(),
        "defaults": state.config.default_selection,
        "cache_ttl_secs": state.config.cache_ttl_secs,
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub ticker: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
}

fn parse_or<T: FromStr<Err = ParseSelectionError>>(
    raw: Option<&str>,
    default: T,
) -> Result<T, ParseSelectionError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(default),
    }
}

impl DashboardQuery {
    fn is_empty(&self) -> bool {
        [&self.ticker, &self.period, &self.interval]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }

    /// Resolve to a selection, using `defaults` for omitted or blank fields.
    pub fn resolve(&self, defaults: Selection) -> Result<Selection, ParseSelectionError> {
        Ok(Selection {
            ticker: parse_or(self.ticker.as_deref(), defaults.ticker)?,
            period: parse_or(self.period.as_deref(), defaults.period)?,
            interval: parse_or(self.interval.as_deref(), defaults.interval)?,
        })
    }
}

fn bad_selection(e: ParseSelectionError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": e.to_string(),
            "field": e.field,
            "allowed": e.allowed,
        })),
    )
}

fn upstream_failure(selection: Selection, e: anyhow::Error) -> ApiError {
    let error_id = Uuid::new_v4();
    let chain = format!("{e:#}");
    error!(
        error_id = %error_id,
        selection = %selection,
        error = %chain,
        "dashboard request failed"
    );
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({
            "error": format!("Failed to load data for {}: {e}", selection.ticker),
            "hint": RETRY_HINT,
            "error_id": error_id.to_string(),
        })),
    )
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let selection = query
        .resolve(state.config.default_selection)
        .map_err(bad_selection)?;

    let (entry, cached) = state
        .fetcher
        .fetch(selection)
        .await
        .map_err(|e| upstream_failure(selection, e))?;

    let mut report = build_report(
        selection,
        &entry.series,
        &entry.metadata,
        &state.config.indicators,
    )
    .map_err(|e| upstream_failure(selection, e))?;
    report.cached = cached;
    report.data_fetched_at = Some(entry.fetched_at_utc);

    info!(
        selection = %selection,
        bars = entry.series.len(),
        cached,
        "dashboard served"
    );

    Ok(Json(report))
}

// =============================================================================
// Cache control
// =============================================================================

/// Without parameters every entry is dropped. With any of ticker, period or
/// interval only that selection (defaults filling the rest) is invalidated.
async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cache = state.fetcher.cache();

    if query.is_empty() {
        let removed = cache.clear();
        info!(removed, "cache cleared");
        return Ok(Json(serde_json::json!({ "cleared": removed })));
    }

    let selection = query
        .resolve(state.config.default_selection)
        .map_err(bad_selection)?;
    let removed = usize::from(cache.invalidate(selection));
    info!(selection = %selection, removed, "cache entry invalidated");
    Ok(Json(serde_json::json!({
        "cleared": removed,
        "selection": selection,
    })))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::market_data::provider::testing::StaticProvider;
    use crate::market_data::FundMetadata;
    use crate::runtime_config::DashboardConfig;

    fn state_with(provider: StaticProvider) -> (Arc<AppState>, Arc<StaticProvider>) {
        let provider = Arc::new(provider);
        let state = Arc::new(AppState::new(DashboardConfig::default(), provider.clone()));
        (state, provider)
    }

    fn rising_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 400.0 + i as f64 * 0.5).collect()
    }

    async fn call(
        state: Arc<AppState>,
        method: Method,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let resp = router(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn query_resolution_falls_back_to_defaults() {
        let defaults = Selection::default();
        let q = DashboardQuery {
            ticker: Some("qqq".into()),
            period: Some("  ".into()),
            interval: None,
        };
        let sel = q.resolve(defaults).unwrap();
        assert_eq!(sel.ticker, Ticker::Qqq);
        assert_eq!(sel.period, Period::OneYear);
        assert_eq!(sel.interval, Interval::Daily);

        let bad = DashboardQuery {
            interval: Some("1h".into()),
            ..Default::default()
        };
        assert_eq!(bad.resolve(defaults).unwrap_err().field, "interval");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (state, _) = state_with(StaticProvider::new(vec![1.0]));
        let (status, body) = call(state, Method::GET, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cached_entries"], 0);
    }

    #[tokio::test]
    async fn options_lists_allowed_values_and_defaults() {
        let (state, _) = state_with(StaticProvider::new(vec![1.0]));
        let (status, body) = call(state, Method::GET, "/api/v1/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"].as_array().unwrap().len(), 6);
        assert_eq!(body["periods"][0], "1mo");
        assert_eq!(body["intervals"][1], "1wk");
        assert_eq!(body["defaults"]["ticker"], "VOO");
        assert_eq!(body["defaults"]["period"], "1y");
    }

    #[tokio::test]
    async fn dashboard_returns_full_report() {
        let mut provider = StaticProvider::new(rising_closes(260));
        provider.metadata = Some(FundMetadata {
            long_name: Some("Vanguard S&P 500 ETF".into()),
            ..Default::default()
        });
        let (state, _) = state_with(provider);

        let (status, body) = call(
            state,
            Method::GET,
            "/api/v1/dashboard?ticker=spy&period=2y&interval=1d",
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["selection"]["ticker"], "SPY");
        assert_eq!(body["selection"]["period"], "2y");
        assert_eq!(body["chart"].as_array().unwrap().len(), 260);
        assert_eq!(body["recent"].as_array().unwrap().len(), 20);
        assert_eq!(body["signals"]["trend"]["signal"], "strong_uptrend");
        assert_eq!(body["signals"]["rsi"]["signal"], "overbought");
        assert_eq!(body["metadata"]["display"]["long_name"], "Vanguard S&P 500 ETF");
        assert_eq!(body["metadata"]["display"]["category"], "N/A");
        assert_eq!(body["cached"], false);
        assert_eq!(body["data_source"], "Yahoo Finance");
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let (state, provider) = state_with(StaticProvider::new(rising_closes(30)));

        call(state.clone(), Method::GET, "/api/v1/dashboard").await;
        let (status, body) = call(state.clone(), Method::GET, "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached"], true);
        assert_eq!(provider.history_calls(), 1);

        let (_, cleared) = call(state.clone(), Method::DELETE, "/api/v1/cache").await;
        assert_eq!(cleared["cleared"], 1);

        call(state, Method::GET, "/api/v1/dashboard").await;
        assert_eq!(provider.history_calls(), 2);
    }

    #[tokio::test]
    async fn cache_delete_can_target_one_selection() {
        let (state, provider) = state_with(StaticProvider::new(rising_closes(30)));

        call(state.clone(), Method::GET, "/api/v1/dashboard?ticker=VOO").await;
        call(state.clone(), Method::GET, "/api/v1/dashboard?ticker=QQQ").await;
        assert_eq!(provider.history_calls(), 2);

        let (status, body) =
            call(state.clone(), Method::DELETE, "/api/v1/cache?ticker=qqq").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], 1);
        assert_eq!(body["selection"]["ticker"], "QQQ");

        let (_, voo) = call(state.clone(), Method::GET, "/api/v1/dashboard?ticker=VOO").await;
        assert_eq!(voo["cached"], true);
        let (_, qqq) = call(state, Method::GET, "/api/v1/dashboard?ticker=QQQ").await;
        assert_eq!(qqq["cached"], false);
        assert_eq!(provider.history_calls(), 3);
    }

    #[tokio::test]
    async fn invalid_selection_is_bad_request() {
        let (state, provider) = state_with(StaticProvider::new(vec![1.0]));
        let (status, body) = call(state, Method::GET, "/api/v1/dashboard?ticker=ARKK").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "ticker");
        assert!(body["allowed"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "VOO"));
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_with_hint() {
        let mut provider = StaticProvider::new(vec![1.0]);
        provider.fail_history = true;
        let (state, _) = state_with(provider);

        let (status, body) = call(state.clone(), Method::GET, "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["hint"], RETRY_HINT);
        assert!(body["error"].as_str().unwrap().contains("VOO"));
        assert!(Uuid::parse_str(body["error_id"].as_str().unwrap()).is_ok());
        assert_eq!(state.fetcher.cache().fresh_len(), 0);
    }

    #[tokio::test]
    async fn cache_delete_after_failed_fetch_clears_nothing() {
        let mut provider = StaticProvider::new(vec![1.0]);
        provider.fail_history = true;
        let (state, _) = state_with(provider);

        call(state.clone(), Method::GET, "/api/v1/dashboard").await;
        call(state.clone(), Method::GET, "/api/v1/dashboard?ticker=QQQ").await;

        let (_, one) = call(state.clone(), Method::DELETE, "/api/v1/cache?ticker=VOO").await;
        assert_eq!(one["cleared"], 0);
        let (_, all) = call(state.clone(), Method::DELETE, "/api/v1/cache").await;
        assert_eq!(all["cleared"], 0);
        let (_, health) = call(state, Method::GET, "/api/v1/health").await;
        assert_eq!(health["cached_entries"], 0);
    }

    #[tokio::test]
    async fn empty_history_is_bad_gateway() {
        let (state, _) = state_with(StaticProvider::new(Vec::new()));
        let (status, body) = call(state, Method::GET, "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("no price data"));
    }
}
