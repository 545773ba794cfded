//! HTTP/JSON API server.
//!
//! Routes: `/` (HTML dashboard), `/api/quotes` (JSON), `/download_csv`
//! (CSV attachment), `/health`. The read path depends on the configured
//! refresh mode: lazy reads go through the cache's single-flight
//! read-or-refresh, eager reads only ever touch the published snapshot.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::render;
use crate::cache::SnapshotCache;
use crate::config::RefreshMode;
use crate::scheduler::RefreshScheduler;
use crate::snapshot::{QuoteRow, Snapshot};

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Published-snapshot cache.
    pub cache: Arc<SnapshotCache>,
    /// Cycle driver, used directly by lazy reads.
    pub scheduler: Arc<RefreshScheduler>,
    /// Configured refresh mode.
    pub mode: RefreshMode,
    /// TTL in seconds, surfaced as the page auto-refresh interval.
    pub ttl_secs: u64,
}

/// Create the Axum router with all endpoints.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/quotes", get(api_quotes))
        .route("/download_csv", get(download_csv))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Resolve the snapshot to serve, refreshing first in lazy mode.
async fn current_snapshot(state: &AppState) -> Option<Arc<Snapshot>> {
    match state.mode {
        RefreshMode::Lazy => {
            let scheduler = Arc::clone(&state.scheduler);
            Some(
                state
                    .cache
                    .read_or_refresh(|| async move { scheduler.run_cycle().await })
                    .await,
            )
        }
        // Eager reads never block on network I/O; before the first cycle
        // completes there is simply nothing to serve yet.
        RefreshMode::Eager => state.cache.cached(),
    }
}

/// Main dashboard page.
async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let snapshot = current_snapshot(&state).await;
    Html(render::render_dashboard(snapshot.as_deref(), state.ttl_secs))
}

/// JSON view of the latest snapshot.
#[derive(Debug, Serialize)]
struct QuotesResponse {
    /// Completion time of the cycle that produced the rows.
    captured_at: DateTime<Utc>,
    /// Snapshot age at response time, in seconds.
    age_secs: u64,
    /// Full-width row set, universe order.
    rows: Vec<QuoteRow>,
}

/// JSON API endpoint.
async fn api_quotes(State(state): State<AppState>) -> Response {
    let Some(snapshot) = current_snapshot(&state).await else {
        return (StatusCode::SERVICE_UNAVAILABLE, "no snapshot available yet").into_response();
    };

    let age = snapshot.age(Utc::now()).num_seconds().max(0) as u64;
    Json(QuotesResponse {
        captured_at: snapshot.captured_at,
        age_secs: age,
        rows: snapshot.rows.clone(),
    })
    .into_response()
}

/// CSV download endpoint.
///
/// Rows with no numeric data are dropped from the export; when nothing
/// remains the endpoint answers 404, matching the dashboard's historical
/// behavior.
async fn download_csv(State(state): State<AppState>) -> Response {
    let Some(snapshot) = current_snapshot(&state).await else {
        return (StatusCode::NOT_FOUND, "Error: No data available for download.").into_response();
    };

    match render::to_csv(&snapshot) {
        Ok(Some(body)) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock_data_live.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Ok(None) => {
            (StatusCode::NOT_FOUND, "Error: No data available for download.").into_response()
        }
        Err(error) => {
            tracing::error!(error = %error, "CSV serialization failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::scheduler::SchedulerConfig;
    use crate::snapshot::{QuoteRow, RowStatus};
    use crate::universe::SymbolRegistry;
    use crate::upstream::client::{UpstreamClient, UpstreamConfig};

    /// Eager-mode state backed by a pre-published snapshot; the scheduler is
    /// never invoked on this path.
    fn make_state(snapshot: Option<Snapshot>) -> AppState {
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(60)));
        if let Some(snapshot) = snapshot {
            cache.publish(snapshot);
        }

        let registry = SymbolRegistry;
        let universe = registry.universe(&["SBIN".to_string()]);
        let client = UpstreamClient::new(
            &UpstreamConfig::default().with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();
        let scheduler = Arc::new(RefreshScheduler::new(
            client,
            universe,
            SchedulerConfig::default(),
        ));

        AppState {
            cache,
            scheduler,
            mode: RefreshMode::Eager,
            ttl_secs: 60,
        }
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot::new(vec![
            QuoteRow {
                symbol: "SBIN".to_string(),
                last_price: Some(612.45),
                open: Some(610.0),
                high: Some(615.2),
                low: Some(608.1),
                previous_close: Some(609.9),
                volume: Some(1_234_567),
                status: RowStatus::Ok,
            },
            QuoteRow::failed("ZEEL".to_string(), "request timed out".to_string()),
        ])
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = create_router(make_state(None));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_renders_table() {
        let app = create_router(make_state(Some(sample_snapshot())));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("SBIN"));
        assert!(body.contains("ZEEL"));
        assert!(body.contains("Failed: request timed out"));
    }

    #[tokio::test]
    async fn dashboard_before_first_cycle() {
        let app = create_router(make_state(None));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("No stock data available"));
    }

    #[tokio::test]
    async fn api_returns_full_width_rows() {
        let app = create_router(make_state(Some(sample_snapshot())));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/quotes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["rows"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["rows"][0]["last_price"], 612.45);
        assert!(parsed["rows"][1]["last_price"].is_null());
    }

    #[tokio::test]
    async fn api_without_snapshot_is_unavailable() {
        let app = create_router(make_state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/quotes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn csv_download_sets_attachment_headers() {
        let app = create_router(make_state(Some(sample_snapshot())));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/download_csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"stock_data_live.csv\""
        );

        let body = body_string(response).await;
        assert!(body.contains("SBIN"));
        assert!(!body.contains("ZEEL"));
    }

    #[tokio::test]
    async fn csv_download_404_when_no_data() {
        let snapshot = Snapshot::new(vec![QuoteRow::failed(
            "ZEEL".to_string(),
            "timeout".to_string(),
        )]);
        let app = create_router(make_state(Some(snapshot)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/download_csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
