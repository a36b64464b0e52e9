// Shared fixtures for zvpn-core integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use zvpn_core::config::Settings;
use zvpn_core::error::{ProcessError, Result};
use zvpn_core::process::{Liveness, ProcessControl, ProcessSupervisor, SpawnRequest, StopTarget};
use zvpn_core::state::StateStore;

/// A call made through the fake control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Spawn(SpawnRequest),
    Terminate(StopTarget),
    Probe(i32),
}

/// ProcessControl that records calls and returns canned results
#[derive(Debug, Clone)]
pub struct RecordingControl {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub spawn_pid: i32,
    pub spawn_error: Option<ProcessError>,
    pub terminate_error: Option<ProcessError>,
    pub alive: HashSet<i32>,
    pub probe_error: Option<ProcessError>,
}

impl Default for RecordingControl {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            spawn_pid: 4242,
            spawn_error: None,
            terminate_error: None,
            alive: HashSet::new(),
            probe_error: None,
        }
    }
}

impl RecordingControl {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl ProcessControl for RecordingControl {
    fn spawn(&self, request: &SpawnRequest, mut log: File) -> Result<i32> {
        self.calls.borrow_mut().push(Call::Spawn(request.clone()));
        if let Some(e) = &self.spawn_error {
            return Err(e.clone().into());
        }
        writeln!(log, "fake client output")?;
        Ok(self.spawn_pid)
    }

    fn terminate(&self, target: &StopTarget) -> Result<()> {
        self.calls.borrow_mut().push(Call::Terminate(target.clone()));
        match &self.terminate_error {
            Some(e) => Err(e.clone().into()),
            None => Ok(()),
        }
    }

    fn probe(&self, pid: i32) -> Result<Liveness> {
        self.calls.borrow_mut().push(Call::Probe(pid));
        if let Some(e) = &self.probe_error {
            return Err(e.clone().into());
        }
        if self.alive.contains(&pid) {
            Ok(Liveness::Alive)
        } else {
            Ok(Liveness::Gone)
        }
    }
}

/// Scratch directory laid out like a real installation
pub struct Fixture {
    pub dir: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("configs")).unwrap();
        let settings = Settings {
            config_dir: Some(dir.path().join("configs")),
            pid_file: dir.path().join("zvpn.pid"),
            log_file: dir.path().join("zvpn.log"),
            ..Settings::default()
        };
        Self { dir, settings }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("configs")
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(
            self.config_dir(),
            self.settings.pid_file.clone(),
            self.settings.log_file.clone(),
        )
    }

    pub fn supervisor<C: ProcessControl>(
        &self,
        control: C,
    ) -> ProcessSupervisor<C> {
        ProcessSupervisor::new(self.store(), control, self.settings.clone())
    }

    /// Supervisor whose configuration directory is `config_dir`
    pub fn supervisor_in<C: ProcessControl>(
        &self,
        config_dir: PathBuf,
        control: C,
    ) -> ProcessSupervisor<C> {
        let store = StateStore::new(
            config_dir,
            self.settings.pid_file.clone(),
            self.settings.log_file.clone(),
        );
        ProcessSupervisor::new(store, control, self.settings.clone())
    }

    pub fn add_config(&self, name: &str) {
        std::fs::write(self.config_dir().join(name), "client\nremote vpn.example.com 1194\n")
            .unwrap();
    }

    pub fn write_pid_file(&self, content: &str) {
        std::fs::write(&self.settings.pid_file, content).unwrap();
    }

    pub fn pid_file(&self) -> &Path {
        &self.settings.pid_file
    }
}
