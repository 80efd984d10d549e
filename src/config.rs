//! Configuration
//!
//! Layered configuration for the backend endpoints, history store, health
//! polling and logging. Sources, lowest precedence first: built-in defaults,
//! the user's XDG config file, the workspace `config/config.toml`, the
//! workspace `config/{QUILL_ENV}.toml`, and `QUILL_*` environment variables.

use crate::history::HISTORY_CAPACITY;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;
mod merge {
    pub mod merge_policy;
}
pub mod paths;
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Streaming endpoint root; sessions connect to `{ws_url}/ws/generate`.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            ));
        }
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(format!(
                "ws_url '{}' must start with ws:// or wss://",
                self.ws_url
            ));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err("Timeouts must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "paths::default_history_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            store_path: paths::default_history_path(),
            capacity: default_history_capacity(),
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.as_os_str().is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        if self.capacity == 0 || self.capacity > HISTORY_CAPACITY {
            return Err(format!(
                "capacity must be between 1 and {}, got {}",
                HISTORY_CAPACITY, self.capacity
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,

    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

fn default_health_interval_secs() -> u64 {
    30
}

fn default_status_interval_secs() -> u64 {
    15
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            health_interval_secs: default_health_interval_secs(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Backend(String),
    History(String),
    Polling(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Backend(msg) => write!(f, "Backend: {}", msg),
            ValidationError::History(msg) => write!(f, "History: {}", msg),
            ValidationError::Polling(msg) => write!(f, "Polling: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl QuillConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.backend.validate() {
            errors.push(ValidationError::Backend(e));
        }
        if let Err(e) = self.history.validate() {
            errors.push(ValidationError::History(e));
        }
        if self.polling.health_interval_secs == 0 {
            errors.push(ValidationError::Polling(
                "health_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.polling.status_interval_secs == 0 {
            errors.push(ValidationError::Polling(
                "status_interval_secs must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Streaming endpoint for generation sessions.
    pub fn stream_url(&self) -> String {
        crate::session::stream_url(&self.backend.ws_url)
    }
}
