//! Runtime configuration.
//!
//! Everything is sourced from environment variables with sensible defaults;
//! `.env` files are honored at startup via `dotenvy`. Bad values fall back to
//! the default rather than aborting startup.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `QUOTEBOARD_MODE` | `lazy` | `lazy` (refresh on stale read) or `eager` (background loop) |
//! | `QUOTEBOARD_TTL_SECS` | `60` | Snapshot time-to-live / eager refresh period |
//! | `QUOTEBOARD_HTTP_PORT` | `8080` | HTTP listen port |
//! | `QUOTEBOARD_REQUEST_TIMEOUT_SECS` | `10` | Per-attempt upstream timeout |
//! | `QUOTEBOARD_RETRY_ATTEMPTS` | `3` | Attempts per symbol per cycle |
//! | `QUOTEBOARD_RETRY_DELAY_MS` | `500` | Fixed pause between attempts |
//! | `QUOTEBOARD_SYMBOL_DELAY_MS` | `200` | Courtesy pause between symbols |
//! | `QUOTEBOARD_CONCURRENCY` | `1` | Max simultaneous fetches |
//! | `QUOTEBOARD_SYMBOLS` | built-in | Comma-separated universe override |
//! | `QUOTEBOARD_UPSTREAM_BASE_URL` | Yahoo | Override both upstream endpoints |

use std::str::FromStr;
use std::time::Duration;

use crate::scheduler::SchedulerConfig;
use crate::universe::SymbolRegistry;
use crate::upstream::client::UpstreamConfig;
use crate::upstream::retry::RetryPolicy;

/// How the cache is kept fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// A stale read triggers a synchronous refresh (single-flight).
    Lazy,
    /// A background loop refreshes on a fixed period; reads never block.
    Eager,
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(format!("unknown refresh mode: {other}")),
        }
    }
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Cache refresh strategy.
    pub mode: RefreshMode,
    /// Snapshot TTL; doubles as the eager refresh period.
    pub ttl: Duration,
    /// HTTP listen port.
    pub http_port: u16,
    /// Display identifiers polled every cycle, in order.
    pub display_ids: Vec<String>,
    /// Upstream client settings.
    pub upstream: UpstreamConfig,
    /// Per-cycle scheduling settings.
    pub scheduler: SchedulerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RefreshMode::Lazy,
            ttl: Duration::from_secs(60),
            http_port: 8080,
            display_ids: SymbolRegistry::default_display_ids(),
            upstream: UpstreamConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mode = parse_env("QUOTEBOARD_MODE", RefreshMode::Lazy);
        let ttl = Duration::from_secs(parse_env("QUOTEBOARD_TTL_SECS", 60u64));
        let http_port = parse_env("QUOTEBOARD_HTTP_PORT", 8080u16);

        let display_ids = std::env::var("QUOTEBOARD_SYMBOLS").map_or_else(
            |_| SymbolRegistry::default_display_ids(),
            |raw| parse_symbol_list(&raw),
        );

        let retry = RetryPolicy {
            max_attempts: parse_env("QUOTEBOARD_RETRY_ATTEMPTS", 3u32),
            attempt_timeout: Duration::from_secs(parse_env(
                "QUOTEBOARD_REQUEST_TIMEOUT_SECS",
                10u64,
            )),
            retry_delay: Duration::from_millis(parse_env("QUOTEBOARD_RETRY_DELAY_MS", 500u64)),
        };

        let mut upstream = UpstreamConfig::default().with_retry(retry);
        if let Ok(base) = std::env::var("QUOTEBOARD_UPSTREAM_BASE_URL") {
            upstream = upstream.with_base_url(&base);
        }

        let scheduler = SchedulerConfig {
            symbol_delay: Duration::from_millis(parse_env("QUOTEBOARD_SYMBOL_DELAY_MS", 200u64)),
            concurrency: parse_env("QUOTEBOARD_CONCURRENCY", 1usize).max(1),
        };

        Self {
            mode,
            ttl,
            http_port,
            display_ids,
            upstream,
            scheduler,
        }
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated symbol list, dropping empty entries.
fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
