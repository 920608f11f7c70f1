//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging to stderr.
///
/// `RUST_LOG` overrides the level (default `info`), e.g.
/// `RUST_LOG=rcbeam_core=debug` to see every grid point.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Logging for tests; safe to call more than once.
#[cfg(test)]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
