//! Structured logging for the petclinic binary
//!
//! Level priority: `RUST_LOG` > `--debug` > `[logging] level` in config >
//! `info`. Output goes to stderr in tracing's compact format.

use tracing_subscriber::EnvFilter;

/// Level used when nothing else selects one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialise the global tracing subscriber
///
/// `debug_flag` is true when `--debug` was passed; `config_level` comes from
/// the config file. Calling this twice keeps the first subscriber.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(filter_directive(debug_flag, config_level)),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();

    if installed.is_ok() {
        tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Logging initialised");
    }
}

/// Filter directive when `RUST_LOG` is not set
fn filter_directive(debug_flag: bool, config_level: Option<&str>) -> String {
    if debug_flag {
        return "debug".to_string();
    }
    config_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}
