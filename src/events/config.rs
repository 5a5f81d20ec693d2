//! Configuration for event buses.

use serde::{Deserialize, Serialize};

use crate::events::types::{EventError, EventResult};

/// Default bound on the per-channel invocation history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Configuration for an [`EventBus`](crate::events::bus::EventBus).
///
/// Diagnostics (subscriber labels and invocation history in
/// [`snapshot`](crate::events::bus::EventBus::snapshot)) are a runtime flag;
/// dispatch behavior and ordering are identical with the flag on or off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Collect per-channel subscriber labels and invocation history.
    pub diagnostics: bool,
    /// Bounded length of the per-channel invocation history (FIFO, oldest
    /// evicted first).
    pub history_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            // Inspector data is collected in debug builds unless a config
            // says otherwise; release builds opt in explicitly.
            diagnostics: cfg!(debug_assertions),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl EventBusConfig {
    /// Enable diagnostics collection.
    pub fn with_diagnostics(mut self) -> Self {
        self.diagnostics = true;
        self
    }

    /// Disable diagnostics collection.
    pub fn without_diagnostics(mut self) -> Self {
        self.diagnostics = false;
        self
    }

    /// Set the invocation-history bound.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Load configuration from environment variables
    /// (`EVENT_CORE_DIAGNOSTICS`, `EVENT_CORE_HISTORY_CAPACITY`), falling
    /// back to defaults for unset variables.
    pub fn from_env() -> EventResult<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("EVENT_CORE_DIAGNOSTICS") {
            config.diagnostics = value
                .parse()
                .map_err(|_| EventError::Config(format!("invalid EVENT_CORE_DIAGNOSTICS: {value}")))?;
        }
        if let Ok(value) = std::env::var("EVENT_CORE_HISTORY_CAPACITY") {
            config.history_capacity = value
                .parse()
                .map_err(|_| EventError::Config(format!("invalid EVENT_CORE_HISTORY_CAPACITY: {value}")))?;
        }
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> EventResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EventError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| EventError::Config(e.to_string()))
    }
}
