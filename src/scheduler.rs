//! Refresh cycle driver.
//!
//! [`RefreshScheduler::run_cycle`] produces one complete [`Snapshot`]: it
//! establishes a single upstream session, walks the universe in order, and
//! degrades failures into rows instead of errors. A cycle is infallible by
//! construction — the worst case (session establishment failed) is a snapshot
//! where every row is `Failed`.
//!
//! The same `run_cycle` serves both modes: the lazy cache calls it on demand,
//! and [`RefreshScheduler::run_eager_loop`] drives it on a fixed period.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cache::SnapshotCache;
use crate::normalize::{normalize, session_failed_row};
use crate::snapshot::{QuoteRow, Snapshot};
use crate::universe::Instrument;
use crate::upstream::client::{Session, UpstreamClient};

/// Tuning for one refresh cycle.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Courtesy pause between consecutive symbol fetches (sequential mode).
    pub symbol_delay: Duration,
    /// Maximum simultaneous in-flight fetches. `1` keeps fetches sequential,
    /// which is what the upstream's informal rate limits favor.
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            symbol_delay: Duration::from_millis(200),
            concurrency: 1,
        }
    }
}

/// Drives fetch + normalize across the instrument universe.
#[derive(Debug)]
pub struct RefreshScheduler {
    client: UpstreamClient,
    universe: Vec<Instrument>,
    config: SchedulerConfig,
}

impl RefreshScheduler {
    /// Create a scheduler over a fixed universe.
    #[must_use]
    pub fn new(client: UpstreamClient, universe: Vec<Instrument>, config: SchedulerConfig) -> Self {
        Self {
            client,
            universe,
            config,
        }
    }

    /// Number of instruments polled per cycle.
    #[must_use]
    pub fn universe_len(&self) -> usize {
        self.universe.len()
    }

    /// Run one full refresh cycle.
    ///
    /// Always returns a snapshot with exactly one row per instrument, in
    /// universe order. Per-symbol failures degrade that symbol's row only;
    /// session failure degrades every row with the session reason.
    pub async fn run_cycle(&self) -> Snapshot {
        let session = match self.client.establish_session().await {
            Ok(session) => session,
            Err(error) => {
                tracing::error!(error = %error, "Session establishment failed, degrading cycle");
                let reason = error.to_string();
                let rows = self
                    .universe
                    .iter()
                    .map(|inst| session_failed_row(&inst.display_id, &reason))
                    .collect();
                return Snapshot::new(rows);
            }
        };

        let rows = if self.config.concurrency > 1 {
            self.fetch_fanned_out(&session).await
        } else {
            self.fetch_sequential(&session).await
        };

        let snapshot = Snapshot::new(rows);
        let failed = snapshot
            .rows
            .iter()
            .filter(|row| !row.status.is_fetched())
            .count();
        tracing::info!(
            rows = snapshot.rows.len(),
            failed,
            "Refresh cycle complete"
        );
        snapshot
    }

    /// Fetch the universe one symbol at a time with a courtesy delay.
    async fn fetch_sequential(&self, session: &Session) -> Vec<QuoteRow> {
        let mut rows = Vec::with_capacity(self.universe.len());
        for (index, instrument) in self.universe.iter().enumerate() {
            if index > 0 && !self.config.symbol_delay.is_zero() {
                tokio::time::sleep(self.config.symbol_delay).await;
            }
            let outcome = self
                .client
                .fetch_one(session, &instrument.upstream_id)
                .await;
            rows.push(normalize(&instrument.display_id, outcome));
        }
        rows
    }

    /// Fetch with a bounded fan-out. `buffered` keeps universe order.
    async fn fetch_fanned_out(&self, session: &Session) -> Vec<QuoteRow> {
        futures::stream::iter(self.universe.clone())
            .map(|instrument| async move {
                let outcome = self
                    .client
                    .fetch_one(session, &instrument.upstream_id)
                    .await;
                normalize(&instrument.display_id, outcome)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await
    }

    /// Background driver for eager mode.
    ///
    /// Publishes a fresh snapshot every `period`. Missed ticks are skipped so
    /// slow cycles never stack, and a cycle interrupted by shutdown is
    /// abandoned without publishing partial results.
    pub async fn run_eager_loop(
        self: Arc<Self>,
        cache: Arc<SnapshotCache>,
        period: Duration,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = shutdown.cancelled() => break,
            }

            tokio::select! {
                snapshot = self.run_cycle() => {
                    cache.publish(snapshot);
                }
                () = shutdown.cancelled() => {
                    tracing::info!("Refresh cycle abandoned during shutdown");
                    break;
                }
            }
        }

        tracing::info!("Eager refresh loop stopped");
    }
}
