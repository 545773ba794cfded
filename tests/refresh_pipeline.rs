//! End-to-end pipeline tests against a mocked upstream.
//!
//! Exercises the session -> fetch -> normalize -> snapshot -> cache path with
//! a wiremock server standing in for the quote API.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quoteboard::cache::SnapshotCache;
use quoteboard::config::RefreshMode;
use quoteboard::scheduler::{RefreshScheduler, SchedulerConfig};
use quoteboard::server::{AppState, create_router};
use quoteboard::snapshot::RowStatus;
use quoteboard::universe::SymbolRegistry;
use quoteboard::upstream::client::{UpstreamClient, UpstreamConfig};
use quoteboard::upstream::retry::RetryPolicy;

/// Retry policy with no real sleeping, for fast tests.
fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        attempt_timeout: Duration::from_secs(5),
        retry_delay: Duration::ZERO,
    }
}

/// Scheduler config with no inter-symbol pause.
fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        symbol_delay: Duration::ZERO,
        concurrency: 1,
    }
}

fn scheduler_for(server_url: &str, display_ids: &[&str], attempts: u32) -> RefreshScheduler {
    let config = UpstreamConfig::default()
        .with_base_url(server_url)
        .with_retry(fast_retry(attempts));
    let client = UpstreamClient::new(&config).unwrap();

    let ids: Vec<String> = display_ids.iter().map(ToString::to_string).collect();
    let universe = SymbolRegistry.universe(&ids);

    RefreshScheduler::new(client, universe, fast_scheduler())
}

fn quote_body(last: f64, open: f64, volume: u64) -> serde_json::Value {
    json!({
        "quoteSummary": {
            "result": [{
                "price": {
                    "currentPrice": {"raw": last, "fmt": format!("{last:.2}")},
                    "regularMarketPreviousClose": {"raw": open}
                },
                "summaryDetail": {
                    "open": open,
                    "dayHigh": last + 1.0,
                    "dayLow": open - 1.0,
                    "previousClose": open,
                    "volume": volume
                }
            }],
            "error": null
        }
    })
}

/// Mount the cookie-priming endpoint.
async fn mount_priming(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_quote(server: &MockServer, upstream_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v10/finance/quoteSummary/{upstream_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn cycle_produces_full_width_snapshot_in_universe_order() {
    let server = MockServer::start().await;
    mount_priming(&server).await;
    mount_quote(&server, "SBIN.NS", quote_body(612.45, 610.0, 1_234_567)).await;
    mount_quote(&server, "INFY.NS", quote_body(1520.0, 1500.0, 987_654)).await;

    let scheduler = scheduler_for(&server.uri(), &["SBIN", "INFY"], 3);
    let snapshot = scheduler.run_cycle().await;

    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[0].symbol, "SBIN");
    assert_eq!(snapshot.rows[1].symbol, "INFY");
    assert_eq!(snapshot.rows[0].last_price, Some(612.45));
    assert_eq!(snapshot.rows[0].volume, Some(1_234_567));
    assert_eq!(snapshot.rows[0].status, RowStatus::Ok);
    assert_eq!(snapshot.rows[1].status, RowStatus::Ok);
}

#[tokio::test]
async fn failed_symbol_degrades_only_its_row() {
    let server = MockServer::start().await;
    mount_priming(&server).await;
    mount_quote(&server, "SBIN.NS", quote_body(10.0, 9.0, 100)).await;
    // INFY answers 500 on every attempt; the retry budget is 3.
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/INFY.NS"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server.uri(), &["SBIN", "INFY"], 3);
    let snapshot = scheduler.run_cycle().await;

    assert_eq!(snapshot.rows.len(), 2);

    let ok_row = &snapshot.rows[0];
    assert_eq!(ok_row.status, RowStatus::Ok);
    assert_eq!(ok_row.last_price, Some(10.0));
    assert_eq!(ok_row.volume, Some(100));

    let failed_row = &snapshot.rows[1];
    assert_eq!(
        failed_row.status,
        RowStatus::Failed("upstream returned HTTP 500".to_string())
    );
    assert!(failed_row.is_empty());
}

#[tokio::test]
async fn transient_errors_recover_within_retry_budget() {
    let server = MockServer::start().await;
    mount_priming(&server).await;

    // Two 503s, then success on the third attempt.
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/SBIN.NS"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_quote(&server, "SBIN.NS", quote_body(10.0, 9.0, 100)).await;

    let scheduler = scheduler_for(&server.uri(), &["SBIN"], 3);
    let snapshot = scheduler.run_cycle().await;

    assert_eq!(snapshot.rows[0].status, RowStatus::Ok);
    assert_eq!(snapshot.rows[0].last_price, Some(10.0));
}

#[tokio::test]
async fn markup_body_is_retried_then_degraded() {
    let server = MockServer::start().await;
    mount_priming(&server).await;

    // A block page instead of JSON, on every attempt.
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/SBIN.NS"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Access denied</body></html>"),
        )
        .expect(3)
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server.uri(), &["SBIN"], 3);
    let snapshot = scheduler.run_cycle().await;

    match &snapshot.rows[0].status {
        RowStatus::Failed(reason) => assert!(reason.contains("malformed body")),
        other => panic!("expected Failed row, got {other:?}"),
    }
}

#[tokio::test]
async fn session_failure_degrades_every_row() {
    // Nothing listens here: session priming fails at the transport level.
    let scheduler = scheduler_for("http://127.0.0.1:1", &["SBIN", "INFY", "WIPRO"], 3);
    let snapshot = scheduler.run_cycle().await;

    assert_eq!(snapshot.rows.len(), 3);
    for row in &snapshot.rows {
        assert!(row.is_empty());
        match &row.status {
            RowStatus::Failed(reason) => assert!(reason.contains("session priming failed")),
            other => panic!("expected Failed row, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn concurrent_lazy_reads_trigger_one_cycle() {
    let server = MockServer::start().await;

    // Exactly one priming call means exactly one refresh cycle ran.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/SBIN.NS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body(10.0, 9.0, 100)))
        .expect(1)
        .mount(&server)
        .await;

    let state = AppState {
        cache: Arc::new(SnapshotCache::new(Duration::from_secs(60))),
        scheduler: Arc::new(scheduler_for(&server.uri(), &["SBIN"], 3)),
        mode: RefreshMode::Lazy,
        ttl_secs: 60,
    };
    let router = create_router(state);

    let request = || {
        Request::builder()
            .uri("/api/quotes")
            .body(Body::empty())
            .unwrap()
    };
    let (a, b, c, d) = tokio::join!(
        router.clone().oneshot(request()),
        router.clone().oneshot(request()),
        router.clone().oneshot(request()),
        router.clone().oneshot(request()),
    );

    for response in [a, b, c, d] {
        assert_eq!(response.unwrap().status(), StatusCode::OK);
    }

    server.verify().await;
}

#[tokio::test]
async fn eager_loop_populates_cache_and_stops_on_cancel() {
    let server = MockServer::start().await;
    mount_priming(&server).await;
    mount_quote(&server, "SBIN.NS", quote_body(10.0, 9.0, 100)).await;

    let scheduler = Arc::new(scheduler_for(&server.uri(), &["SBIN"], 3));
    let cache = Arc::new(SnapshotCache::new(Duration::from_secs(60)));
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(Arc::clone(&scheduler).run_eager_loop(
        Arc::clone(&cache),
        Duration::from_millis(50),
        shutdown.clone(),
    ));

    // The first tick fires immediately; wait for it to publish.
    let mut published = false;
    for _ in 0..50 {
        if cache.cached().is_some() {
            published = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(published, "eager loop never published a snapshot");

    let snapshot = cache.cached().unwrap();
    assert_eq!(snapshot.rows.len(), 1);
    assert_eq!(snapshot.rows[0].status, RowStatus::Ok);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("eager loop did not stop after cancellation")
        .unwrap();
}
