//! Logging setup over `tracing-subscriber`.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::events::types::{EventError, EventResult};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The log level to use.
    pub level: Level,
    /// Whether to emit JSON-formatted output.
    pub json: bool,
    /// Whether to include file and line information.
    pub file_info: bool,
    /// Whether to log span open/close events.
    pub log_spans: bool,
    /// Application name to include in logs.
    pub app_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            json: false,
            file_info: false,
            log_spans: false,
            app_name: "event-core".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Enable JSON formatting.
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Enable file and line information in logs.
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Enable span logging.
    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }
}

/// Install a global subscriber with the provided configuration.
///
/// Fails if a global subscriber is already installed (hosts own the choice;
/// call this once from the binary, not from libraries).
pub fn setup_logging(config: LoggingConfig) -> EventResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let span_events = if config.log_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    if config.json {
        subscriber
            .json()
            .try_init()
            .map_err(|e| EventError::Config(e.to_string()))
    } else {
        subscriber
            .try_init()
            .map_err(|e| EventError::Config(e.to_string()))
    }
}

/// Parse a log level from a string.
pub fn parse_log_level(level: &str) -> EventResult<Level> {
    Level::from_str(level).map_err(|_| EventError::Config(format!("Invalid log level: {level}")))
}
