//! Entry preconditions
//!
//! The supervisor must run as root and the client binary must be on PATH.

use std::path::PathBuf;

use nix::unistd::{geteuid, Uid};
use tracing::debug;
use zvpn_core::error::{PreconditionError, ZvpnError};

/// Fail unless the effective user is root
pub fn ensure_privileged() -> Result<(), ZvpnError> {
    check_privilege(geteuid())?;
    Ok(())
}

fn check_privilege(euid: Uid) -> Result<(), PreconditionError> {
    if euid.is_root() {
        Ok(())
    } else {
        Err(PreconditionError::NotPrivileged)
    }
}

/// Resolve the client binary on PATH
pub fn ensure_client_installed(binary: &str) -> Result<PathBuf, ZvpnError> {
    let path = which::which(binary).map_err(|_| PreconditionError::ClientNotFound {
        binary: binary.to_string(),
    })?;
    debug!("Found {} at {:?}", binary, path);
    Ok(path)
}
