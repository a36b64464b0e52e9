//! Error types for the zvpn supervisor
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the zvpn application
#[derive(Error, Debug)]
pub enum ZvpnError {
    /// Entry checks that must pass before any action is taken
    #[error("{0}")]
    Precondition(#[from] PreconditionError),

    /// Invalid operator input; nothing was changed
    #[error("{0}")]
    Input(#[from] InputError),

    /// The pid record exists but does not hold a usable process id
    #[error("Invalid PID in PID file {}: {content:?}", .path.display())]
    StateCorruption { path: PathBuf, content: String },

    /// Failures reported by the external client or the signalling layer
    #[error("{0}")]
    Process(#[from] ProcessError),

    /// Errors related to settings loading/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Checks performed once at entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("This program must be run with sudo or as the root user.")]
    NotPrivileged,

    #[error("{binary} is not installed on your system. Please install it first.")]
    ClientNotFound { binary: String },

    #[error("Configuration directory {} was not created. Aborting.", .path.display())]
    ConfigDirDeclined { path: PathBuf },
}

/// Operator input errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid choice: {input:?}")]
    InvalidChoice { input: String },

    #[error("No valid config files found in {}", .dir.display())]
    NoCandidates { dir: PathBuf },

    #[error("No prior configuration recorded. Run without arguments to select one.")]
    NoPriorConfig,
}

/// External process failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Failed to start service: {reason}")]
    SpawnFailed { reason: String },

    #[error("Failed to stop the VPN service: {reason}")]
    TerminationFailed { reason: String },

    #[error("Failed to stop the VPN service: no running {name} process found")]
    NoMatchingProcess { name: String },

    #[error("Failed to stop the VPN service: process group {pgid} not found")]
    GroupNotFound { pgid: i32 },

    #[error("Failed to check process {pid}: {reason}")]
    ProbeFailed { pid: i32, reason: String },
}

/// Settings-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load settings file: {path}")]
    LoadFailed { path: String },

    #[error("Settings validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

impl ZvpnError {
    /// Process exit code for this error
    ///
    /// Precondition and settings problems exit with 2, a corrupt pid record
    /// with 3, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ZvpnError::Precondition(_) | ZvpnError::Config(_) | ZvpnError::Toml(_) => 2,
            ZvpnError::StateCorruption { .. } => 3,
            ZvpnError::Input(_) | ZvpnError::Process(_) | ZvpnError::Io(_) => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ZvpnError>;
