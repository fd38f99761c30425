//! Tracing subscriber setup for hosts and tests.
//!
//! The library only emits events; nothing here runs unless the host asks.

#[cfg(test)]
#[path = "telemetry_test.rs"]
mod telemetry_test;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "stage_engine=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG`. Returns `false` if a
/// global subscriber was already set.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_FILTER)
}

/// [`init_tracing`] with a caller-chosen fallback directive.
pub fn init_tracing_with(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}
