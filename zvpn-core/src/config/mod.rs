//! Configuration module
//!
//! Runtime settings for the supervisor: where state lives, which client to
//! launch and how stops are carried out. Loaded from an optional TOML file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod toml_config;

/// Name of the marker file holding the last selected configuration
pub const LAST_CONFIG_FILE: &str = ".last_config";

/// What a stop request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopScope {
    /// Every process on the host whose name matches the client binary
    #[default]
    ByName,
    /// Only the process group of the recorded pid
    TrackedGroup,
}

/// When the pid record is removed after a stop attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PidRecordPolicy {
    /// Remove after every attempt, whether or not termination succeeded
    #[default]
    AlwaysRemove,
    /// Keep the record when the termination request fails
    RemoveOnSuccess,
}

/// What to do when the last-config marker cannot be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveFailurePolicy {
    /// Report the failure and start the client anyway
    #[default]
    Continue,
    /// Report the failure and do not start
    Abort,
}

/// Supervisor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `*.ovpn` files and the last-config marker.
    /// Resolved from the operator's home directory when unset.
    pub config_dir: Option<PathBuf>,

    /// Pid record of the tracked client
    pub pid_file: PathBuf,

    /// Append-only log receiving the client's stdout and stderr
    pub log_file: PathBuf,

    /// Client executable, looked up on PATH
    pub client_binary: String,

    /// File extension (without the dot) of selectable configurations
    pub config_extension: String,

    /// Launch the client through `sudo`
    pub use_sudo: bool,

    pub stop_scope: StopScope,

    pub pid_record_policy: PidRecordPolicy,

    /// Seconds to wait after SIGTERM before SIGKILL (tracked-group scope)
    pub stop_grace_secs: u64,

    pub on_save_failure: SaveFailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: None,
            pid_file: PathBuf::from("/tmp/zvpn.pid"),
            log_file: PathBuf::from("/tmp/zvpn.log"),
            client_binary: "openvpn".to_string(),
            config_extension: "ovpn".to_string(),
            use_sudo: false,
            stop_scope: StopScope::default(),
            pid_record_policy: PidRecordPolicy::default(),
            stop_grace_secs: 5,
            on_save_failure: SaveFailurePolicy::default(),
        }
    }
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.client_binary.trim().is_empty() {
            return Err("Client binary cannot be empty".to_string());
        }

        if self.config_extension.is_empty() {
            return Err("Config extension cannot be empty".to_string());
        }

        if self.config_extension.starts_with('.') {
            return Err("Config extension must not start with a dot".to_string());
        }

        if self.pid_file == self.log_file {
            return Err("PID file and log file must differ".to_string());
        }

        if self.stop_scope == StopScope::TrackedGroup && self.stop_grace_secs == 0 {
            return Err("Stop grace period cannot be zero".to_string());
        }

        Ok(())
    }

    /// Suffix a file name must end with to be offered as a configuration
    pub fn config_suffix(&self) -> String {
        format!(".{}", self.config_extension)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}
