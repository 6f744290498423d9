//! Logging setup.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a formatting subscriber for the binary.
///
/// Honours `RUST_LOG` (default `info`), e.g. `RUST_LOG=u_roster=debug`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
