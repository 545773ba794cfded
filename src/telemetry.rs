//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with environment filter.
///
/// Defaults to `info` for this crate when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a subscriber is already installed.
#[allow(clippy::expect_used)]
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "quoteboard=info"
                    .parse()
                    .expect("static directive 'quoteboard=info' is valid"),
            ),
        )
        .init();
}
