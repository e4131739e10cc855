//! Tracing bootstrap for the BTO portal.
//!
//! `RUST_LOG` wins when set; otherwise the configured level becomes the
//! filter. Output is compact plain text, suitable for service logs.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter {
        directive: String,
        source: ParseError,
    },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directive, .. } => {
                write!(f, "log filter '{directive}' is not a valid tracing directive")
            }
            TelemetryError::Init(err) => {
                write!(f, "could not install the tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| level_filter(&config.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Init)
}

fn level_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        directive: directive.to_string(),
        source,
    })
}
