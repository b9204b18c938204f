pub mod config;
pub mod error;
pub mod handlers;
pub mod pricing;
pub mod rates;
pub mod server;
pub mod store;
pub mod tables;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Note: This function can only be called once per process. The filter is
/// taken from RUST_LOG when set, otherwise defaults to "info".
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
