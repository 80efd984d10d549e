//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use crate::config::paths::default_history_path;
use crate::history::HISTORY_CAPACITY;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("backend.base_url", "http://localhost:8000")?
        .set_default("backend.ws_url", "ws://localhost:8000")?
        .set_default("backend.request_timeout_secs", 30)?
        .set_default("backend.connect_timeout_secs", 10)?
        .set_default(
            "history.store_path",
            default_history_path().to_string_lossy().to_string(),
        )?
        .set_default("history.capacity", HISTORY_CAPACITY as u64)?
        .set_default("polling.health_interval_secs", 30)?
        .set_default("polling.status_interval_secs", 15)
}
