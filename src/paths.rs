//! Centralized path resolution for rawinit
//!
//! # Environment Variables
//!
//! - `RAWINIT_CONFIG` - Path of the config file to use
//! - `RAWINIT_CONFIG_DIR` - Override config directory
//!
//! # Config File Resolution
//!
//! 1. `--config PATH` (must exist)
//! 2. `RAWINIT_CONFIG` environment variable (must exist)
//! 3. `./rawinit.toml`
//! 4. `<config dir>/config.toml`, where the config dir is
//!    `RAWINIT_CONFIG_DIR`, else `XDG_CONFIG_HOME/rawinit`, else the
//!    platform default (`%APPDATA%\rawinit` on Windows,
//!    `~/.config/rawinit` elsewhere)
//!
//! When nothing is found, built-in defaults apply.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "RAWINIT_CONFIG";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "RAWINIT_CONFIG_DIR";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "rawinit.toml";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the rawinit config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("rawinit");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            return Ok(app_data.join("rawinit"));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("rawinit"))
}

/// Locate the config file to load, if any
///
/// An explicitly requested file (flag or environment) is returned even if
/// it does not exist, so loading it reports the problem.
pub fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(expand(&path.to_string_lossy())));
    }

    if let Ok(path) = std::env::var(ENV_CONFIG) {
        log::debug!("Using config file from {ENV_CONFIG}: {path}");
        return Ok(Some(expand(&path)));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    let global = config_dir()?.join(CONFIG_FILE);
    if global.is_file() {
        return Ok(Some(global));
    }

    log::debug!("No config file found, using defaults");
    Ok(None)
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
