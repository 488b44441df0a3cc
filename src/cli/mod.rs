//! Command-line front end
//!
//! Thin layer over the library: resolves the storage root and the current
//! project, then prints what the core returns. Errors are reported through
//! `anyhow` with context.

pub mod commands;

use tracing_subscriber::EnvFilter;

pub use commands::{Cli, Commands, run};

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded in another program
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}
