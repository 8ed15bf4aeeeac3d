//! Logging setup for the CLI and the desktop window.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so compiled CSV can be piped from stdout. `RUST_LOG`
/// overrides the default `csv_compiler=info` (`debug` when verbose).
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "csv_compiler=debug"
    } else {
        "csv_compiler=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
