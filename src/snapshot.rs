//! Snapshot data model.
//!
//! A [`Snapshot`] is an immutable capture of one refresh cycle: one
//! [`QuoteRow`] per instrument in the universe, in universe order. Failed
//! fetches still produce a row, so `rows.len()` always equals the universe
//! length and consumers see a stable table shape across cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of fetching and normalizing one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RowStatus {
    /// Every field in the row resolved.
    Ok,
    /// The fetch succeeded but the upstream omitted one or more fields.
    PartialData,
    /// The fetch failed after exhausting retries; all numeric fields are absent.
    Failed(String),
}

impl RowStatus {
    /// Whether the underlying fetch succeeded.
    #[must_use]
    pub const fn is_fetched(&self) -> bool {
        matches!(self, Self::Ok | Self::PartialData)
    }
}

/// One instrument's quote for a single refresh cycle.
///
/// Numeric fields are `Option` throughout: `None` means the upstream did not
/// provide the field, which is distinct from a present zero. Display-level
/// placeholder policy ("N/A") lives in the presentation layer, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    /// Display identifier (universe name, not the upstream symbol).
    pub symbol: String,
    /// Last traded price.
    pub last_price: Option<f64>,
    /// Opening price for the session.
    pub open: Option<f64>,
    /// Session high.
    pub high: Option<f64>,
    /// Session low.
    pub low: Option<f64>,
    /// Previous session close.
    pub previous_close: Option<f64>,
    /// Traded volume.
    pub volume: Option<u64>,
    /// Fetch/normalization outcome for this row.
    pub status: RowStatus,
}

impl QuoteRow {
    /// Build a degraded row for a fetch that failed after retries.
    #[must_use]
    pub const fn failed(symbol: String, reason: String) -> Self {
        Self {
            symbol,
            last_price: None,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            volume: None,
            status: RowStatus::Failed(reason),
        }
    }

    /// True when every numeric field is absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last_price.is_none()
            && self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.previous_close.is_none()
            && self.volume.is_none()
    }
}

/// Immutable result of one full refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// One row per instrument, in universe order.
    pub rows: Vec<QuoteRow>,
    /// Completion time of the cycle that produced these rows.
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time.
    #[must_use]
    pub fn new(rows: Vec<QuoteRow>) -> Self {
        Self {
            rows,
            captured_at: Utc::now(),
        }
    }

    /// Age of this snapshot relative to `now`.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.captured_at
    }
}
