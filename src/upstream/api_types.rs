//! Wire types for the upstream quoteSummary API.
//!
//! Every field is optional: which fields the upstream includes varies with
//! market state (pre-open, open, closed), and field presence is the
//! upstream's decision, not ours. Numeric values arrive in three shapes —
//! bare numbers, formatted strings (`"12,345"`), and `{raw, fmt}` wrapper
//! objects — all folded into [`RawValue`].

use serde::{Deserialize, Serialize};

/// A numeric value in any of the shapes the upstream emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Bare JSON number.
    Number(f64),
    /// Formatted string, possibly with thousands separators.
    Text(String),
    /// `{raw, fmt}` wrapper object.
    Wrapped {
        /// Machine-readable value.
        raw: Option<Box<RawValue>>,
        /// Display-formatted value.
        fmt: Option<String>,
    },
    /// Anything else; coerces to absent.
    Other(serde_json::Value),
}

impl RawValue {
    /// Coerce to a float, or `None` when the value is malformed.
    ///
    /// Formatted strings are parsed after stripping separators; a wrapper
    /// prefers its `raw` field and falls back to parsing `fmt`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) | Self::Other(_) => None,
            Self::Text(s) => parse_numeric(s),
            Self::Wrapped { raw, fmt } => raw
                .as_ref()
                .and_then(|v| v.as_f64())
                .or_else(|| fmt.as_deref().and_then(parse_numeric)),
        }
    }

    /// Coerce to a non-negative integer, or `None`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        let value = self.as_f64()?;
        if value >= 0.0 && value <= u64::MAX as f64 {
            Some(value.round() as u64)
        } else {
            None
        }
    }
}

/// Parse a string like `"12,345.5"` into a float.
fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The `price` section of a quoteSummary result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceSection {
    /// Last traded price, when the upstream provides it directly.
    pub current_price: Option<RawValue>,
    /// Regular-session market price.
    pub regular_market_price: Option<RawValue>,
    /// Regular-session open.
    pub regular_market_open: Option<RawValue>,
    /// Regular-session high.
    pub regular_market_day_high: Option<RawValue>,
    /// Regular-session low.
    pub regular_market_day_low: Option<RawValue>,
    /// Previous regular-session close.
    pub regular_market_previous_close: Option<RawValue>,
    /// Regular-session volume.
    pub regular_market_volume: Option<RawValue>,
}

/// The `summaryDetail` section of a quoteSummary result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryDetailSection {
    /// Session open.
    pub open: Option<RawValue>,
    /// Session high.
    pub day_high: Option<RawValue>,
    /// Session low.
    pub day_low: Option<RawValue>,
    /// Previous close.
    pub previous_close: Option<RawValue>,
    /// Session volume.
    pub volume: Option<RawValue>,
}

/// One instrument's raw payload: the sections we read from a result entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuote {
    /// Price section, when present.
    pub price: Option<PriceSection>,
    /// Summary-detail section, when present.
    pub summary_detail: Option<SummaryDetailSection>,
}

/// Top-level quoteSummary response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteSummaryResponse {
    /// Envelope wrapping the result list.
    pub quote_summary: QuoteSummaryEnvelope,
}

/// Envelope with the per-symbol result list and an optional error object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteSummaryEnvelope {
    /// Result entries; at most one per requested symbol.
    pub result: Option<Vec<RawQuote>>,
    /// Upstream-reported error, if any.
    pub error: Option<serde_json::Value>,
}

impl QuoteSummaryResponse {
    /// Take the first result entry out of the envelope.
    #[must_use]
    pub fn into_quote(self) -> Option<RawQuote> {
        self.quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_from_number() {
        let v: RawValue = serde_json::from_str("100.5").unwrap();
        assert_eq!(v.as_f64(), Some(100.5));
    }

    #[test]
    fn raw_value_from_formatted_string() {
        let v: RawValue = serde_json::from_str("\"12,345\"").unwrap();
        assert_eq!(v.as_f64(), Some(12345.0));
        assert_eq!(v.as_u64(), Some(12345));
    }

    #[test]
    fn raw_value_from_wrapper() {
        let v: RawValue = serde_json::from_str(r#"{"raw": 1520.25, "fmt": "1,520.25"}"#).unwrap();
        assert_eq!(v.as_f64(), Some(1520.25));
    }

    #[test]
    fn raw_value_wrapper_falls_back_to_fmt() {
        let v: RawValue = serde_json::from_str(r#"{"fmt": "2,100.00"}"#).unwrap();
        assert_eq!(v.as_f64(), Some(2100.0));
    }

    #[test]
    fn malformed_values_coerce_to_absent() {
        let v: RawValue = serde_json::from_str("\"not a number\"").unwrap();
        assert_eq!(v.as_f64(), None);

        let v: RawValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v.as_f64(), None);
    }

    #[test]
    fn negative_volume_is_absent() {
        let v = RawValue::Number(-5.0);
        assert_eq!(v.as_u64(), None);
        assert_eq!(v.as_f64(), Some(-5.0));
    }

    #[test]
    fn zero_passes_through() {
        let v = RawValue::Number(0.0);
        assert_eq!(v.as_f64(), Some(0.0));
        assert_eq!(v.as_u64(), Some(0));
    }

    #[test]
    fn envelope_extracts_first_result() {
        let body = r#"{
            "quoteSummary": {
                "result": [{"price": {"regularMarketPrice": {"raw": 10.0}}}],
                "error": null
            }
        }"#;
        let response: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        let quote = response.into_quote().unwrap();
        let price = quote.price.unwrap();
        assert_eq!(price.regular_market_price.unwrap().as_f64(), Some(10.0));
    }

    #[test]
    fn empty_result_list_yields_none() {
        let body = r#"{"quoteSummary": {"result": [], "error": null}}"#;
        let response: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_quote().is_none());
    }
}
