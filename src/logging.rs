//! Diagnostic logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber: `RUST_LOG` filter (default `info`) and a
/// plain formatter on stderr. Later calls are no-ops.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
