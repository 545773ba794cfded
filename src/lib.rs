// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines
    )
)]

//! QuoteBoard - cached NSE quote dashboard.
//!
//! A fetch-cache-serve pipeline: poll an upstream quote API for a fixed
//! universe of instruments, normalize the heterogeneous payloads into a fixed
//! row schema, hold the latest full snapshot in a TTL-bounded cache, and
//! serve it over HTTP without blocking each request on a live network
//! round-trip.
//!
//! # Pipeline
//!
//! ```text
//! RefreshScheduler -> UpstreamClient -> Normalizer -> Snapshot -> SnapshotCache
//!                                                                      |
//!                                         HTML / JSON / CSV  <- axum reads
//! ```
//!
//! - [`universe`]: instrument universe and display-to-upstream symbol mapping
//! - [`upstream`]: session priming, per-symbol fetches, bounded retries
//! - [`normalize`]: fallback-chain field extraction into [`snapshot::QuoteRow`]
//! - [`cache`]: TTL cache with atomic publish and lazy single-flight refresh
//! - [`scheduler`]: cycle driver (on-demand or fixed-period background loop)
//! - [`server`]: axum routes and snapshot rendering

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod config;
pub mod normalize;
pub mod scheduler;
pub mod server;
pub mod snapshot;
pub mod telemetry;
pub mod universe;
pub mod upstream;

pub use cache::SnapshotCache;
pub use config::{AppConfig, RefreshMode};
pub use scheduler::{RefreshScheduler, SchedulerConfig};
pub use server::{AppState, create_router};
pub use snapshot::{QuoteRow, RowStatus, Snapshot};
pub use universe::{Instrument, SymbolRegistry};
pub use upstream::{FetchError, RetryPolicy, SessionError, UpstreamClient, UpstreamConfig};
