//! Persisted supervisor state
//!
//! Three facts survive between invocations: the last selected configuration
//! name, the pid of the tracked client, and the append-only client log.
//! All of them are plain files shared by every invocation on the host,
//! accessed without locking. Concurrent invocations race on the pid record
//! (last writer wins) and interleave appends in the log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::toml_config::last_config_path;
use crate::error::{ZvpnError, Result};

/// Contents of the pid record as found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PidRecord {
    /// No record file
    Absent,
    /// A positive process id
    Valid(i32),
    /// The file exists but does not hold a positive integer
    Corrupt(String),
}

impl PidRecord {
    /// Parse raw record contents
    ///
    /// Zero and negative values are corrupt: signalling them would address
    /// a process group rather than a single process.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => PidRecord::Valid(pid),
            _ => PidRecord::Corrupt(raw.to_string()),
        }
    }
}

/// A client process started by this tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedProcess {
    pub pid: i32,
    pub started_from: PathBuf,
}

/// File-backed store for the pid record, last-config marker and log
#[derive(Debug, Clone)]
pub struct StateStore {
    config_dir: PathBuf,
    pid_file: PathBuf,
    log_file: PathBuf,
}

impl StateStore {
    pub fn new(config_dir: PathBuf, pid_file: PathBuf, log_file: PathBuf) -> Self {
        Self {
            config_dir,
            pid_file,
            log_file,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Read the pid record without interpreting liveness
    pub fn read_pid(&self) -> Result<PidRecord> {
        match fs::read_to_string(&self.pid_file) {
            Ok(content) => Ok(PidRecord::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PidRecord::Absent),
            Err(e) => Err(ZvpnError::Io(e)),
        }
    }

    /// Whether a pid record file exists, regardless of its contents
    pub fn has_pid_record(&self) -> bool {
        self.pid_file.exists()
    }

    pub fn write_pid(&self, pid: i32) -> Result<()> {
        fs::write(&self.pid_file, pid.to_string())?;
        debug!("Wrote PID {} to {:?}", pid, self.pid_file);
        Ok(())
    }

    /// Remove the pid record; a missing record is not an error
    pub fn remove_pid(&self) -> Result<()> {
        match fs::remove_file(&self.pid_file) {
            Ok(()) => {
                debug!("Removed PID file {:?}", self.pid_file);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ZvpnError::Io(e)),
        }
    }

    /// Name of the last selected configuration, if any
    ///
    /// Surrounding whitespace is ignored and an empty marker counts as absent.
    pub fn read_last_config(&self) -> Result<Option<String>> {
        match fs::read_to_string(last_config_path(&self.config_dir)) {
            Ok(content) => {
                let name = content.trim();
                if name.is_empty() {
                    warn!("Last-config marker is empty");
                    Ok(None)
                } else {
                    Ok(Some(name.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ZvpnError::Io(e)),
        }
    }

    /// Overwrite the last-config marker with exactly `name`
    pub fn write_last_config(&self, name: &str) -> Result<()> {
        let path = last_config_path(&self.config_dir);
        fs::write(&path, name)?;
        info!("Saved last used configuration {:?}", name);
        Ok(())
    }

    /// Open the log for appending, creating it when missing
    pub fn open_log_append(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        Ok(file)
    }

    /// Append a timestamped marker line ahead of a client run
    pub fn append_start_marker(&self, log: &mut File, config: &Path) -> Result<()> {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(log, "--- zvpn start {} config={} ---", stamp, config.display())?;
        Ok(())
    }

    /// Read the whole log
    pub fn read_log(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.log_file)?)
    }
}
