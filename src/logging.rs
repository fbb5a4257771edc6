//! tracing subscriber setup.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global subscriber, writing to stderr.
///
/// `filter` uses `EnvFilter` directive syntax (`info`, `gem_price=debug`, ...).
/// An unparsable filter falls back to `info`.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Warning: invalid log filter '{filter}' ({e}), using 'info'");
        EnvFilter::new("info")
    });

    let verbose = filter.contains("debug") || filter.contains("trace");
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }
}
