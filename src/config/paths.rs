//! XDG path helpers.

use std::path::PathBuf;

pub const APP_NAME: &str = "quill";

/// `$XDG_CONFIG_HOME/quill/config.toml`, falling back to `~/.config/quill/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(base.join(APP_NAME).join("config.toml"))
}

/// Per-user data directory (`$XDG_DATA_HOME/quill` on Linux).
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn default_history_path() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("history"))
        .unwrap_or_else(|| PathBuf::from(".quill").join("history"))
}
