use crate::config::{LogFormat, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

/// Targets that log per-connection chatter at info and below.
const QUIET_TARGETS: [&str; 3] = ["redis=warn", "hyper=warn", "tower_http=warn"];

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { filter: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { filter, .. } => {
                write!(f, "APP_LOG_LEVEL '{filter}' is not a valid tracing filter")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a global tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Build the filter from `RUST_LOG` when present, otherwise from the
/// configured level, with transport chatter capped at warn.
pub(crate) fn filter_for(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => return Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| TelemetryError::InvalidFilter {
            filter: log_level.to_string(),
            source,
        })?,
    };

    for target in QUIET_TARGETS {
        if let Ok(directive) = target.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    Ok(filter)
}

/// Install the process-wide subscriber once; later calls fail with
/// `AlreadyInstalled`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&config.log_level)?)
        .with_target(false)
        .with_ansi(false);

    match config.log_format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .try_init()
            .map_err(TelemetryError::AlreadyInstalled),
        LogFormat::Compact => builder
            .compact()
            .try_init()
            .map_err(TelemetryError::AlreadyInstalled),
    }
}
