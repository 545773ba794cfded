//! HTTP client for the upstream quote API.
//!
//! One [`Session`] is established per refresh cycle and shared across all
//! symbol fetches in that cycle; the priming request seeds the cookie jar the
//! upstream expects on quote lookups. Per-symbol fetches carry their own
//! timeout and bounded retries.

use std::time::Duration;

use reqwest::Url;

use super::api_types::{QuoteSummaryResponse, RawQuote};
use super::error::{ClientError, FetchError, SessionError};
use super::retry::RetryPolicy;

/// Default cookie-priming endpoint.
const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";

/// Default quote API base URL.
const DEFAULT_QUOTE_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Browser-like user agent; the upstream serves block pages to obvious bots.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

/// Sections requested per symbol.
const QUOTE_MODULES: &str = "price,summaryDetail";

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Cookie-priming endpoint, hit once per cycle.
    pub session_url: String,
    /// Base URL for per-symbol quote lookups.
    pub quote_base_url: String,
    /// Timeout for the priming request.
    pub session_timeout: Duration,
    /// Retry policy applied to each symbol fetch.
    pub retry: RetryPolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            session_url: DEFAULT_SESSION_URL.to_string(),
            quote_base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
            session_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl UpstreamConfig {
    /// Point both endpoints at one base URL (used against mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.session_url = base.to_string();
        self.quote_base_url = base.to_string();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Proof that the cookie-priming request succeeded this cycle.
///
/// Holding a `Session` is the precondition for [`UpstreamClient::fetch_one`];
/// the cookies themselves live in the client's jar.
#[derive(Debug)]
pub struct Session {
    _private: (),
}

/// Client for session priming and per-symbol quote fetches.
#[derive(Debug)]
pub struct UpstreamClient {
    client: reqwest::Client,
    session_url: Url,
    quote_base_url: Url,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Build a client from config.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientError> {
        let session_url = Url::parse(&config.session_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {e}", config.session_url)))?;
        let quote_base_url = Url::parse(&config.quote_base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {e}", config.quote_base_url)))?;

        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .cookie_store(true)
            .timeout(config.session_timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            session_url,
            quote_base_url,
            retry: config.retry.clone(),
        })
    }

    /// Prime the session cookie jar.
    ///
    /// Any completed response counts: the priming endpoint answers 404 while
    /// still setting the consent cookies quote lookups require.
    pub async fn establish_session(&self) -> Result<Session, SessionError> {
        match self.client.get(self.session_url.clone()).send().await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "Session primed");
                Ok(Session { _private: () })
            }
            Err(e) if e.is_timeout() => Err(SessionError::Timeout),
            Err(e) => Err(SessionError::Network(e.to_string())),
        }
    }

    /// Fetch one instrument's raw payload, retrying transient failures.
    ///
    /// Returns the last error once the retry budget is exhausted. The caller
    /// is expected to degrade that symbol's row, not abort the cycle.
    pub async fn fetch_one(
        &self,
        _session: &Session,
        upstream_id: &str,
    ) -> Result<RawQuote, FetchError> {
        let url = self.quote_url(upstream_id)?;
        let mut attempts = self.retry.attempts();
        let mut last_error = FetchError::Timeout;

        loop {
            let Some(attempt) = attempts.start_attempt() else {
                return Err(last_error);
            };

            match self.try_fetch(url.clone()).await {
                Ok(quote) => return Ok(quote),
                Err(error) if error.is_retryable() => {
                    if let Some(delay) = attempts.next_delay() {
                        tracing::warn!(
                            symbol = %upstream_id,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = error;
                }
                Err(error) => {
                    tracing::warn!(symbol = %upstream_id, error = %error, "Fetch failed");
                    return Err(error);
                }
            }
        }
    }

    /// One fetch attempt: request, body-shape check, parse.
    async fn try_fetch(&self, url: Url) -> Result<RawQuote, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.retry.attempt_timeout)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        // A markup body means the upstream served a block/consent page in
        // place of data; treat it as transient, the same as a timeout.
        if body.trim_start().starts_with('<') {
            return Err(FetchError::MalformedBody(
                "markup where JSON was expected".to_string(),
            ));
        }

        let parsed: QuoteSummaryResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedBody(e.to_string()))?;

        parsed
            .into_quote()
            .ok_or_else(|| FetchError::MalformedBody("empty result list".to_string()))
    }

    /// Build the quoteSummary URL for a symbol, percent-encoding the path.
    fn quote_url(&self, upstream_id: &str) -> Result<Url, FetchError> {
        let mut url = self.quote_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::MalformedBody("base URL cannot take a path".to_string()))?
            .extend(["v10", "finance", "quoteSummary", upstream_id]);
        url.query_pairs_mut().append_pair("modules", QUOTE_MODULES);
        Ok(url)
    }
}
