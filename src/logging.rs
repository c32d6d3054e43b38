//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "moexhist=info";

/// Install a stderr subscriber. `RUST_LOG` overrides `level`.
///
/// Output goes to stderr so that CSV written to stdout stays clean.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
