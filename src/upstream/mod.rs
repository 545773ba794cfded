//! Upstream quote source: session priming, per-symbol fetches, retries.

pub mod api_types;
pub mod client;
pub mod error;
pub mod retry;

pub use api_types::{RawQuote, RawValue};
pub use client::{Session, UpstreamClient, UpstreamConfig};
pub use error::{ClientError, FetchError, SessionError};
pub use retry::RetryPolicy;
