//! Config loading facade.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use tracing::debug;

use super::merge::merge_policy;
use super::paths;
use super::sources::{global_file, workspace_file};
use super::QuillConfig;

pub const ENV_PREFIX: &str = "QUILL";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root` from every layered source.
    ///
    /// Nested keys in the environment use `__`, e.g. `QUILL_BACKEND__BASE_URL`.
    pub fn load(workspace_root: &Path) -> Result<QuillConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(environment()).build()?;
        let loaded: QuillConfig = config.try_deserialize()?;
        debug!(
            base_url = %loaded.backend.base_url,
            ws_url = %loaded.backend.ws_url,
            history = %loaded.history.store_path.display(),
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Load a single file on top of the defaults, ignoring every other source.
    pub fn load_from_file(path: &Path) -> Result<QuillConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    pub fn xdg_config_path() -> Option<PathBuf> {
        paths::global_config_path()
    }

    pub fn default() -> QuillConfig {
        QuillConfig::default()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
