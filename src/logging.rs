//! Logging setup for the `gt` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the binary. Output goes to stderr so stdout stays clean for tree and
//! JSON output.

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable that overrides the verbosity flags
pub const LOG_ENV: &str = "GOALTREE_LOG";

/// Map a `-v` count to a level: warn, info, debug, then trace.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Errors if one is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = level_for_verbosity(verbosity);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("goaltree={}", default_level)));

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}
