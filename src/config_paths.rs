//! Where wand-layout keeps its files
//!
//! ```text
//! <config dir>/wand-layout/
//!     config.yaml      tuning overrides
//!     panels.layout    saved advanced panel layout
//!     logs/            daily debug logs
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "wand-layout";

/// Base name of the rolling log file
pub const LOG_FILE_PREFIX: &str = "wand-layout.log";

/// `$XDG_CONFIG_HOME/wand-layout`, `~/.config/wand-layout` or
/// `%APPDATA%\wand-layout`
pub fn config_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "windows") {
        env::var_os("APPDATA").map(PathBuf::from)
    } else {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
    };
    base.map(|dir| dir.join(APP_DIR))
}

fn in_config_dir(name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(name))
}

pub fn config_file() -> Option<PathBuf> {
    in_config_dir("config.yaml")
}

pub fn layout_file() -> Option<PathBuf> {
    in_config_dir("panels.layout")
}

pub fn logs_dir() -> Option<PathBuf> {
    in_config_dir("logs")
}

fn create(path: &Path) -> Result<PathBuf, String> {
    fs::create_dir_all(path)
        .map(|()| path.to_path_buf())
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Create the logs directory (and the config directory above it)
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    create(&logs)
}
