//! Client process control
//!
//! The [`ProcessControl`] trait is the boundary between supervision logic and
//! the host: spawning the client, asking it to terminate, and probing a pid.
//! [`SystemProcessControl`] is the real implementation.

use std::ffi::OsString;
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::error::{ProcessError, Result};

pub mod supervisor;

pub use supervisor::{ProcessSupervisor, ServiceStatus, StopReport};

/// Interval between liveness checks while waiting for a group to exit
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Command line used to launch the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<OsString>,
}

/// What a termination request addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopTarget {
    /// Every process whose name matches exactly
    ByName(String),
    /// The process group led by `pgid`; SIGKILL follows after `grace`
    Group { pgid: i32, grace: Duration },
}

/// Result of a zero-effect signal probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Gone,
}

/// Host operations needed to supervise the client
pub trait ProcessControl {
    /// Start the client detached in its own process group with stdout and
    /// stderr going to `log`. Returns the child's pid.
    fn spawn(&self, request: &SpawnRequest, log: File) -> Result<i32>;

    /// Ask the target to terminate
    fn terminate(&self, target: &StopTarget) -> Result<()>;

    /// Check whether `pid` exists
    fn probe(&self, pid: i32) -> Result<Liveness>;
}

/// [`ProcessControl`] backed by real processes and signals
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessControl;

impl SystemProcessControl {
    pub fn new() -> Self {
        Self
    }

    fn terminate_by_name(&self, name: &str) -> Result<()> {
        debug!("Running pkill -x {}", name);
        let output = Command::new("pkill")
            .arg("-x")
            .arg(name)
            .output()
            .map_err(|e| ProcessError::TerminationFailed {
                reason: format!("failed to run pkill: {}", e),
            })?;

        match output.status.code() {
            Some(0) => {
                info!("Sent SIGTERM to all {} processes", name);
                Ok(())
            }
            // pkill exits 1 when nothing matched
            Some(1) => Err(ProcessError::NoMatchingProcess {
                name: name.to_string(),
            }
            .into()),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ProcessError::TerminationFailed {
                    reason: format!("pkill {}: {}", output.status, stderr.trim()),
                }
                .into())
            }
        }
    }

    fn terminate_group(&self, pgid: i32, grace: Duration) -> Result<()> {
        let group = Pid::from_raw(pgid);

        match killpg(group, Signal::SIGTERM) {
            Ok(()) => debug!("SIGTERM sent to process group {}", pgid),
            Err(Errno::ESRCH) => return Err(ProcessError::GroupNotFound { pgid }.into()),
            Err(e) => {
                return Err(ProcessError::TerminationFailed {
                    reason: format!("SIGTERM to process group {}: {}", pgid, e),
                }
                .into())
            }
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
            if let Err(Errno::ESRCH) = killpg(group, None) {
                info!("Process group {} terminated gracefully", pgid);
                return Ok(());
            }
        }

        warn!(
            "Process group {} did not respond to SIGTERM, sending SIGKILL",
            pgid
        );
        match killpg(group, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::TerminationFailed {
                reason: format!("SIGKILL to process group {}: {}", pgid, e),
            }
            .into()),
        }
    }
}

impl ProcessControl for SystemProcessControl {
    fn spawn(&self, request: &SpawnRequest, log: File) -> Result<i32> {
        let stderr_log = log.try_clone()?;

        let child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr_log))
            // New process group so signals aimed at us do not reach the client
            .process_group(0)
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed {
                reason: format!("{}: {}", request.program, e),
            })?;

        let pid = i32::try_from(child.id()).map_err(|_| ProcessError::SpawnFailed {
            reason: format!("pid {} out of range", child.id()),
        })?;

        info!("Spawned {} with PID {}", request.program, pid);
        Ok(pid)
    }

    fn terminate(&self, target: &StopTarget) -> Result<()> {
        match target {
            StopTarget::ByName(name) => self.terminate_by_name(name),
            StopTarget::Group { pgid, grace } => self.terminate_group(*pgid, *grace),
        }
    }

    fn probe(&self, pid: i32) -> Result<Liveness> {
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => Ok(Liveness::Alive),
            Err(Errno::ESRCH) => Ok(Liveness::Gone),
            // Exists but belongs to someone else
            Err(Errno::EPERM) => Ok(Liveness::Alive),
            Err(e) => Err(ProcessError::ProbeFailed {
                pid,
                reason: e.to_string(),
            }
            .into()),
        }
    }
}
