//! Subscriber setup for structured logging.
//!
//! Everything in the crate logs through `tracing`; this module installs the
//! process-wide subscriber once, as plain text or JSON lines.

use tracing_subscriber::EnvFilter;

use super::config::{AppCfg, LogFormat};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init(cfg: &AppCfg) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let _ = match cfg.log_format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
