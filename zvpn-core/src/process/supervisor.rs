//! Supervision of the single tracked client
//!
//! Lifecycle of the one conceptual slot:
//! Stopped (no pid record) -> Starting -> Running (pid record present)
//! -> Stopping -> Stopped.
//!
//! The pid record is advisory. Its presence alone decides whether a start
//! stops the previous client first; liveness is only checked by `status`.

use std::ffi::OsString;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::{PidRecordPolicy, Settings, StopScope};
use crate::error::{Result, ZvpnError};
use crate::process::{Liveness, ProcessControl, SpawnRequest, StopTarget};
use crate::state::{PidRecord, StateStore, TrackedProcess};

/// Outcome of a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running { pid: i32 },
    NotRunning,
}

/// Outcome of a successful stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReport {
    /// The termination request was delivered
    Stopped,
    /// Tracked-group scope with no pid record: nothing to signal
    NothingTracked,
}

/// Outcome of a successful start
#[derive(Debug)]
pub struct StartReport {
    /// Result of stopping the previous client, when a pid record existed
    pub preempted: Option<Result<StopReport>>,
    pub tracked: TrackedProcess,
}

/// Starts, stops and inspects the tracked client
pub struct ProcessSupervisor<C: ProcessControl> {
    store: StateStore,
    control: C,
    settings: Settings,
}

impl<C: ProcessControl> ProcessSupervisor<C> {
    pub fn new(store: StateStore, control: C, settings: Settings) -> Self {
        Self {
            store,
            control,
            settings,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Command line for launching the client with `config`
    pub fn spawn_request(&self, config: &Path) -> SpawnRequest {
        let mut args: Vec<OsString> = Vec::new();
        let program = if self.settings.use_sudo {
            args.push(OsString::from(&self.settings.client_binary));
            "sudo".to_string()
        } else {
            self.settings.client_binary.clone()
        };
        args.push(OsString::from("--config"));
        args.push(config.as_os_str().to_os_string());

        SpawnRequest { program, args }
    }

    /// Launch the client with `config_path`, stopping any tracked client first
    ///
    /// The config path is not checked here; a bad path surfaces in the
    /// client's own output in the log.
    pub fn start(&self, config_path: &Path) -> Result<StartReport> {
        let preempted = self.stop_if_running();

        let mut log = self.store.open_log_append()?;
        if let Err(e) = self.store.append_start_marker(&mut log, config_path) {
            warn!("Failed to write start marker to log: {}", e);
        }

        let request = self.spawn_request(config_path);
        let pid = self.control.spawn(&request, log).map_err(|e| {
            error!("Failed to spawn {}: {}", request.program, e);
            e
        })?;

        if let Err(e) = self.store.write_pid(pid) {
            error!(
                "Client is running as PID {} but the PID file could not be written",
                pid
            );
            return Err(e);
        }

        info!("VPN client started as PID {} with {:?}", pid, config_path);
        Ok(StartReport {
            preempted,
            tracked: TrackedProcess {
                pid,
                started_from: config_path.to_path_buf(),
            },
        })
    }

    /// Stop the tracked client when a pid record exists
    ///
    /// Returns `None` without doing anything when there is no record.
    pub fn stop_if_running(&self) -> Option<Result<StopReport>> {
        if !self.store.has_pid_record() {
            debug!("No PID file, nothing to stop before start");
            return None;
        }

        info!("Active VPN connection detected, stopping it first");
        Some(self.stop())
    }

    fn stop_target(&self) -> Result<Option<StopTarget>> {
        match self.settings.stop_scope {
            StopScope::ByName => Ok(Some(StopTarget::ByName(self.client_name()))),
            StopScope::TrackedGroup => match self.store.read_pid()? {
                PidRecord::Absent => Ok(None),
                PidRecord::Valid(pid) => Ok(Some(StopTarget::Group {
                    pgid: pid,
                    grace: self.settings.stop_grace(),
                })),
                PidRecord::Corrupt(content) => Err(self.corruption(content)),
            },
        }
    }

    /// Process name used for by-name termination
    fn client_name(&self) -> String {
        Path::new(&self.settings.client_binary)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.settings.client_binary.clone())
    }

    /// Request termination of the client and clear the pid record
    ///
    /// Whether the record survives a failed request depends on the
    /// configured [`PidRecordPolicy`].
    pub fn stop(&self) -> Result<StopReport> {
        let target = match self.stop_target() {
            Ok(Some(target)) => target,
            Ok(None) => {
                info!("No PID file, nothing tracked to stop");
                return Ok(StopReport::NothingTracked);
            }
            Err(e @ ZvpnError::StateCorruption { .. }) => {
                // Nothing to signal, but the record still follows the policy
                if self.settings.pid_record_policy == PidRecordPolicy::AlwaysRemove {
                    warn!("Clearing unusable PID file: {}", e);
                    if let Err(remove_error) = self.store.remove_pid() {
                        error!("Failed to remove PID file: {}", remove_error);
                    }
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!("Requesting termination of {:?}", target);
        let outcome = self.control.terminate(&target);

        let remove = match (&outcome, self.settings.pid_record_policy) {
            (Ok(()), _) => true,
            (Err(_), PidRecordPolicy::AlwaysRemove) => true,
            (Err(e), PidRecordPolicy::RemoveOnSuccess) => {
                warn!("Termination failed ({}), keeping PID file", e);
                false
            }
        };

        if remove {
            if let Err(e) = self.store.remove_pid() {
                error!("Failed to remove PID file: {}", e);
                // A termination failure is the more useful report
                if outcome.is_ok() {
                    return Err(e);
                }
            }
        }

        outcome.map(|()| StopReport::Stopped)
    }

    /// Report whether the recorded pid is alive; never modifies the record
    pub fn status(&self) -> Result<ServiceStatus> {
        match self.store.read_pid()? {
            PidRecord::Absent => Ok(ServiceStatus::NotRunning),
            PidRecord::Corrupt(content) => Err(self.corruption(content)),
            PidRecord::Valid(pid) => match self.control.probe(pid)? {
                Liveness::Alive => Ok(ServiceStatus::Running { pid }),
                Liveness::Gone => {
                    debug!("PID {} from PID file is not alive", pid);
                    Ok(ServiceStatus::NotRunning)
                }
            },
        }
    }

    /// Entire log contents, or `None` when the log does not exist yet
    pub fn log(&self) -> Result<Option<Vec<u8>>> {
        match self.store.read_log() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(ZvpnError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn corruption(&self, content: String) -> ZvpnError {
        ZvpnError::StateCorruption {
            path: self.store.pid_file().to_path_buf(),
            content,
        }
    }
}
