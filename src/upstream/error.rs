//! Upstream error taxonomy.

use thiserror::Error;

/// Session establishment failed; the whole cycle degrades.
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The priming request did not complete within the timeout.
    #[error("session priming timed out")]
    Timeout,

    /// The priming request failed at the transport level.
    #[error("session priming failed: {0}")]
    Network(String),
}

/// The client could not be constructed from its configuration.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A configured base URL did not parse.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client failed to build.
    #[error("HTTP client build failed: {0}")]
    Build(String),
}

/// A single symbol's fetch failed; only that row degrades.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    /// The request did not complete within the per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// The upstream returned a non-success status.
    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    /// The body was not the expected structured payload (e.g. markup from an
    /// interstitial block page). Treated as transient and retried.
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// Transport-level failure (connection reset, DNS, etc.).
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Whether another attempt is worthwhile.
    ///
    /// Timeouts, transport errors, markup bodies, and gateway/rate-limit
    /// statuses are transient. Client errors other than 429 are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::MalformedBody(_) | Self::Network(_) => true,
            Self::HttpStatus(code) => {
                matches!(*code, 408 | 429) || *code >= 500
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}
