//! Tracing setup shared by the engine's binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber: compact lines on stderr, so stdout stays
/// free for command output.
///
/// `verbose` forces debug output for every target. Otherwise `RUST_LOG`
/// selects the filter, falling back to [`DEFAULT_FILTER`].
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = filter(verbose, rust_log.as_deref())?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(filter = ?rust_log, verbose, "logging initialized");
    Ok(())
}

fn filter(
    verbose: bool,
    rust_log: Option<&str>,
) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    if verbose {
        return EnvFilter::try_new("debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(|| EnvFilter::try_new(DEFAULT_FILTER), Ok)
}
