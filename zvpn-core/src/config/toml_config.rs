//! TOML settings file I/O
//!
//! Handles locating and loading the optional settings file and resolving
//! the per-user configuration directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{Settings, LAST_CONFIG_FILE};
use crate::error::{ConfigError, ZvpnError};

/// Default settings file name
const SETTINGS_FILE_NAME: &str = "config.toml";

/// Default configuration directory name under the operator's home
const CONFIG_DIR_NAME: &str = ".zvpn";

/// Resolve the home directory of the operator
///
/// When running under sudo, `HOME` may point at root's home; `SUDO_USER`
/// (with `SUDO_HOME` if set) is preferred so state stays with the invoking user.
pub fn home_dir_from<F>(lookup: F) -> Result<PathBuf, ZvpnError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(sudo_user) = lookup("SUDO_USER").filter(|u| !u.is_empty() && u != "root") {
        let home = lookup("SUDO_HOME").unwrap_or_else(|| format!("/home/{}", sudo_user));
        return Ok(PathBuf::from(home));
    }

    lookup("HOME").map(PathBuf::from).ok_or_else(|| {
        ZvpnError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get the settings file path
///
/// Returns `ZVPN_SETTINGS` if set, otherwise `~/.config/zvpn/config.toml`
pub fn get_settings_path() -> Result<PathBuf, ZvpnError> {
    if let Some(path) = env_lookup("ZVPN_SETTINGS") {
        return Ok(PathBuf::from(path));
    }

    let home = home_dir_from(env_lookup)?;
    Ok(home.join(".config").join("zvpn").join(SETTINGS_FILE_NAME))
}

/// Load settings from the default location
///
/// A missing file yields the defaults.
pub fn load_settings() -> Result<Settings, ZvpnError> {
    let path = get_settings_path()?;
    if !path.exists() {
        debug!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }
    load_settings_from_path(&path)
}

/// Load settings from a specific TOML file
pub fn load_settings_from_path<P: AsRef<Path>>(path: P) -> Result<Settings, ZvpnError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ZvpnError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => ZvpnError::Config(ConfigError::IoError {
            message: format!("Failed to read settings file: {}", e),
        }),
    })?;

    let settings: Settings = toml::from_str(&contents)?;

    settings
        .validate()
        .map_err(|e| ZvpnError::Config(ConfigError::ValidationError { message: e }))?;

    info!("Loaded settings from {:?}", path.as_ref());
    Ok(settings)
}

/// Resolve the configuration directory for these settings
///
/// Order: explicit `config_dir` setting, `ZVPN_CONFIG_DIR`, then `~/.zvpn`.
pub fn resolve_config_dir(settings: &Settings) -> Result<PathBuf, ZvpnError> {
    if let Some(dir) = &settings.config_dir {
        return Ok(dir.clone());
    }

    if let Some(dir) = env_lookup("ZVPN_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }

    Ok(home_dir_from(env_lookup)?.join(CONFIG_DIR_NAME))
}

/// Path of the last-config marker inside a configuration directory
pub fn last_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(LAST_CONFIG_FILE)
}
