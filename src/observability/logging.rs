//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level
//! - Logs go to stderr; stdout may carry rendered documents

use std::io;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(level: &str) -> String {
    format!("gobl_html={level},tower_http={level}", level = level)
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let (pretty, compact, json) = match config.log_format {
        LogFormat::Pretty => (Some(fmt::layer().pretty().with_writer(io::stderr)), None, None),
        LogFormat::Compact => (None, Some(fmt::layer().compact().with_writer(io::stderr)), None),
        LogFormat::Json => (None, None, Some(fmt::layer().json().with_writer(io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(compact)
        .with(json)
        .try_init()
}
