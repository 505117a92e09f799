pub mod config;
pub mod errors;
pub mod session;
pub mod terminal;

use tracing_subscriber::{EnvFilter, fmt};

/// Log to stderr so stdout carries only the session. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
