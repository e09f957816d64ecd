//! Per-user directories for the config file, local storage and logs.
//!
//! `WORKLOG_HOME` replaces both roots with a single directory, so a portable
//! install or a scratch run keeps everything in one place.

use std::path::{Path, PathBuf};

use crate::constants::APP_NAME;
use crate::error::{WlError, WlResult};

/// Environment variable that relocates every client file.
pub const HOME_ENV: &str = "WORKLOG_HOME";

/// Directory holding `worklog.db` and `logs/`.
pub fn data_dir() -> WlResult<PathBuf> {
    resolve(home_override().as_deref(), dirs::data_dir(), "data")
}

/// Directory holding `config.toml`.
pub fn config_dir() -> WlResult<PathBuf> {
    resolve(home_override().as_deref(), dirs::config_dir(), "config")
}

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn resolve(home: Option<&Path>, base: Option<PathBuf>, what: &str) -> WlResult<PathBuf> {
    if let Some(home) = home {
        return Ok(home.to_path_buf());
    }
    base.map(|b| b.join(APP_NAME))
        .ok_or_else(|| WlError::Config(format!("could not determine {what} directory")))
}
