//! Command dispatch
//!
//! Maps each operation mode to supervisor and selection calls and renders
//! their outcomes as operator-facing messages.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::{InputError, Result};
use crate::process::supervisor::{StartReport, StopReport};
use crate::process::{ProcessControl, ProcessSupervisor, ServiceStatus};
use crate::selection::{list_candidates, prompt_choice, record_and_start};

/// Operation requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop any tracked client, pick a configuration, start it
    Interactive,
    /// Start with the last used configuration
    StartLast,
    Stop,
    Status,
    Log,
}

/// Dispatches modes against one supervisor
pub struct CommandRouter<C: ProcessControl> {
    supervisor: ProcessSupervisor<C>,
}

impl<C: ProcessControl> CommandRouter<C> {
    pub fn new(supervisor: ProcessSupervisor<C>) -> Self {
        Self { supervisor }
    }

    /// Run `mode`, reading menu input from `input` and writing messages to `output`
    pub fn run<R, W>(&self, mode: Mode, input: &mut R, output: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        debug!("Dispatching {:?}", mode);
        match mode {
            Mode::Interactive => self.interactive_start(input, output),
            Mode::StartLast => self.start_last_used(output),
            Mode::Stop => {
                let report = self.supervisor.stop()?;
                write_stop_report(report, output)
            }
            Mode::Status => self.show_status(output),
            Mode::Log => self.show_log(output),
        }
    }

    fn interactive_start<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<()> {
        self.write_preempted(self.supervisor.stop_if_running(), output)?;

        let store = self.supervisor.store();
        let suffix = self.supervisor.settings().config_suffix();
        let candidates = list_candidates(store.config_dir(), &suffix)?;
        if candidates.is_empty() {
            return Err(InputError::NoCandidates {
                dir: store.config_dir().to_path_buf(),
            }
            .into());
        }

        let chosen = prompt_choice(&candidates, input, output)?;
        let report = record_and_start(&self.supervisor, &chosen)?;
        if let Some(e) = report.save_error {
            writeln!(output, "Failed to save last used configuration: {}", e)?;
        }
        self.write_started(report.start, output)
    }

    /// The tracked client is stopped and reported before the marker is
    /// read, so the notice is printed even when the start itself fails.
    fn start_last_used<W: Write>(&self, output: &mut W) -> Result<()> {
        self.write_preempted(self.supervisor.stop_if_running(), output)?;

        let store = self.supervisor.store();
        let name = store
            .read_last_config()?
            .ok_or(InputError::NoPriorConfig)?;

        let report = self.supervisor.start(&store.config_dir().join(name))?;
        self.write_started(report, output)
    }

    fn show_status<W: Write>(&self, output: &mut W) -> Result<()> {
        match self.supervisor.status()? {
            ServiceStatus::Running { pid } => {
                writeln!(output, "VPN service is running (PID {}).", pid)?
            }
            ServiceStatus::NotRunning => writeln!(output, "VPN service is not running.")?,
        }
        Ok(())
    }

    fn show_log<W: Write>(&self, output: &mut W) -> Result<()> {
        match self.supervisor.log()? {
            Some(bytes) => {
                writeln!(output, "VPN Logs:")?;
                writeln!(output, "{}", String::from_utf8_lossy(&bytes))?;
            }
            None => writeln!(
                output,
                "VPN log is unreadable: {} does not exist yet.",
                self.supervisor.store().log_file().display()
            )?,
        }
        Ok(())
    }

    fn write_preempted<W: Write>(
        &self,
        preempted: Option<Result<StopReport>>,
        output: &mut W,
    ) -> Result<()> {
        let Some(outcome) = preempted else {
            return Ok(());
        };

        writeln!(
            output,
            "An active VPN connection is detected. Stopping it before starting a new one."
        )?;
        match outcome {
            Ok(report) => write_stop_report(report, output),
            Err(e) => {
                writeln!(output, "{}", e)?;
                Ok(())
            }
        }
    }

    fn write_started<W: Write>(&self, report: StartReport, output: &mut W) -> Result<()> {
        self.write_preempted(report.preempted, output)?;
        writeln!(
            output,
            "VPN started with configuration: {} (PID {})",
            report.tracked.started_from.display(),
            report.tracked.pid
        )?;
        Ok(())
    }
}

fn write_stop_report<W: Write>(report: StopReport, output: &mut W) -> Result<()> {
    match report {
        StopReport::Stopped => writeln!(output, "VPN service stopped.")?,
        StopReport::NothingTracked => writeln!(output, "No tracked VPN process to stop.")?,
    }
    Ok(())
}
