// src/logging.rs
//! Diagnostic output on stderr. Reports go to stdout or the output file, never here.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Installs the global subscriber.
///
/// `STRATA_LOG` wins when set and valid; otherwise the level is `debug` with
/// `verbose` and `info` without. Calling this again is a no-op.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV)
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
