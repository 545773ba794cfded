//! Payload normalization.
//!
//! Turns one fetch outcome into a fixed-schema [`QuoteRow`]. Field extraction
//! follows an explicit fallback chain per field; the chain order is policy,
//! because the upstream omits fields inconsistently across market states
//! (pre-open, open, closed). Malformed values coerce to absent, never to an
//! error, and a present zero passes through untouched — only the presentation
//! layer treats zero as a placeholder.

use crate::snapshot::{QuoteRow, RowStatus};
use crate::upstream::api_types::{PriceSection, RawQuote, RawValue, SummaryDetailSection};
use crate::upstream::error::FetchError;

/// Convert one instrument's fetch outcome into a row.
///
/// A [`FetchError`] produces a `Failed` row with every numeric field absent;
/// that row still occupies the instrument's slot in the snapshot.
#[must_use]
pub fn normalize(display_id: &str, outcome: Result<RawQuote, FetchError>) -> QuoteRow {
    match outcome {
        Ok(quote) => normalize_quote(display_id, &quote),
        Err(error) => QuoteRow::failed(display_id.to_string(), error.to_string()),
    }
}

/// Build a `Failed` row from a cycle-fatal session error.
#[must_use]
pub fn session_failed_row(display_id: &str, reason: &str) -> QuoteRow {
    QuoteRow::failed(display_id.to_string(), reason.to_string())
}

fn normalize_quote(display_id: &str, quote: &RawQuote) -> QuoteRow {
    static EMPTY_PRICE: PriceSection = PriceSection {
        current_price: None,
        regular_market_price: None,
        regular_market_open: None,
        regular_market_day_high: None,
        regular_market_day_low: None,
        regular_market_previous_close: None,
        regular_market_volume: None,
    };
    static EMPTY_DETAIL: SummaryDetailSection = SummaryDetailSection {
        open: None,
        day_high: None,
        day_low: None,
        previous_close: None,
        volume: None,
    };

    let price = quote.price.as_ref().unwrap_or(&EMPTY_PRICE);
    let detail = quote.summary_detail.as_ref().unwrap_or(&EMPTY_DETAIL);

    // Fallback chain order is load-bearing; see module docs.
    let last_price = first_f64(&[
        price.current_price.as_ref(),
        price.regular_market_price.as_ref(),
        price.regular_market_previous_close.as_ref(),
    ]);
    let open = first_f64(&[detail.open.as_ref(), price.regular_market_open.as_ref()]);
    let high = first_f64(&[
        detail.day_high.as_ref(),
        price.regular_market_day_high.as_ref(),
    ]);
    let low = first_f64(&[
        detail.day_low.as_ref(),
        price.regular_market_day_low.as_ref(),
    ]);
    let previous_close = first_f64(&[
        detail.previous_close.as_ref(),
        price.regular_market_previous_close.as_ref(),
    ]);
    let volume = first_u64(&[detail.volume.as_ref(), price.regular_market_volume.as_ref()]);

    let complete = last_price.is_some()
        && open.is_some()
        && high.is_some()
        && low.is_some()
        && previous_close.is_some()
        && volume.is_some();

    QuoteRow {
        symbol: display_id.to_string(),
        last_price,
        open,
        high,
        low,
        previous_close,
        volume,
        status: if complete {
            RowStatus::Ok
        } else {
            RowStatus::PartialData
        },
    }
}

/// First candidate that coerces to a float, in chain order.
fn first_f64(candidates: &[Option<&RawValue>]) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .find_map(|value| value.as_f64())
}

/// First candidate that coerces to a non-negative integer, in chain order.
fn first_u64(candidates: &[Option<&RawValue>]) -> Option<u64> {
    candidates
        .iter()
        .flatten()
        .find_map(|value| value.as_u64())
}
