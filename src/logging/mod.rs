//! Logging infrastructure shared by hosts embedding the event system.

pub mod setup;

pub use setup::{parse_log_level, setup_logging, LoggingConfig};
