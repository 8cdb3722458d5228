//! Structured logging.
//!
//! Uses `tracing` with an `EnvFilter`: `RUST_LOG` wins, otherwise the
//! configured level applies to this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Call once from the binary.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fund_distributor={log_level}").into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
