//! Instrument universe and symbol resolution.
//!
//! The universe is a fixed, ordered list of display identifiers defined at
//! startup. [`SymbolRegistry::resolve`] maps a display identifier to the
//! upstream Yahoo symbol: indices and other special names go through an
//! explicit mapping; everything else gets the `.NS` exchange suffix. The
//! registry is total, so resolution never fails and callers need no error path.

/// Exchange suffix appended to unmapped display identifiers.
const DEFAULT_SUFFIX: &str = ".NS";

/// Display names that do not follow the `.NS` suffix convention.
const SPECIAL_SYMBOLS: &[(&str, &str)] = &[("NIFTY_50", "^NSEI"), ("NIFTY_BANK", "^NSEBANK")];

/// Built-in universe, polled in this order every cycle.
const DEFAULT_UNIVERSE: &[&str] = &[
    "NIFTY_50",
    "NIFTY_BANK",
    "ACC",
    "ADANIPORTS",
    "SBIN",
    "AMBUJACEM",
    "WIPRO",
    "APOLLOTYRE",
    "ASIANPAINT",
    "AUROPHARMA",
    "AXISBANK",
    "BAJFINANCE",
    "IOC",
    "BANKBARODA",
    "BATAINDIA",
    "BERGEPAINT",
    "BHARATFORG",
    "COALINDIA",
    "INDUSINDBK",
    "DRREDDY",
    "INFY",
    "JSWSTEEL",
    "POWERGRID",
    "LICHSGFIN",
    "CANBK",
    "MGL",
    "M&MFIN",
    "HDFCBANK",
    "MANAPPURAM",
    "MARICO",
    "SUNTV",
    "HINDZINC",
    "ICICIBANK",
    "ZEEL",
];

/// One tradable symbol tracked by the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Name shown to consumers and used as the row key.
    pub display_id: String,
    /// Symbol sent to the upstream quote API.
    pub upstream_id: String,
}

/// Static display-to-upstream symbol mapping.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry;

impl SymbolRegistry {
    /// Resolve a display identifier to its upstream symbol.
    ///
    /// Unmapped identifiers fall back to appending [`DEFAULT_SUFFIX`] rather
    /// than erroring; resolution is best-effort by contract.
    #[must_use]
    pub fn resolve(&self, display_id: &str) -> String {
        SPECIAL_SYMBOLS
            .iter()
            .find(|(name, _)| *name == display_id)
            .map_or_else(
                || format!("{display_id}{DEFAULT_SUFFIX}"),
                |(_, upstream)| (*upstream).to_string(),
            )
    }

    /// Build the ordered instrument universe from display identifiers.
    #[must_use]
    pub fn universe(&self, display_ids: &[String]) -> Vec<Instrument> {
        display_ids
            .iter()
            .map(|id| Instrument {
                display_id: id.clone(),
                upstream_id: self.resolve(id),
            })
            .collect()
    }

    /// The built-in display identifiers, in polling order.
    #[must_use]
    pub fn default_display_ids() -> Vec<String> {
        DEFAULT_UNIVERSE.iter().map(ToString::to_string).collect()
    }
}
