//! zvpn - OpenVPN supervisor CLI
//!
//! Launches OpenVPN with a selected configuration as a detached background
//! process and controls that one tracked client afterwards.

use std::ffi::OsString;
use std::io;

use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use colored::Colorize;
use zvpn_core::config::toml_config::{load_settings, resolve_config_dir};
use zvpn_core::error::ZvpnError;
use zvpn_core::init_logging;
use zvpn_core::process::{ProcessSupervisor, SystemProcessControl};
use zvpn_core::router::{CommandRouter, Mode};
use zvpn_core::state::StateStore;

mod cli;

#[derive(Parser)]
#[command(name = "zvpn", version)]
#[command(about = "Start, stop and inspect a background OpenVPN client")]
#[command(group(ArgGroup::new("mode").args(["start", "stop", "status", "log"])))]
struct Cli {
    /// Start with the last used configuration
    #[arg(long)]
    start: bool,
    /// Stop the VPN client
    #[arg(long)]
    stop: bool,
    /// Show whether the tracked client is running
    #[arg(long)]
    status: bool,
    /// Print the client log
    #[arg(long)]
    log: bool,
}

impl Cli {
    /// No flag means interactive selection
    fn mode(&self) -> Mode {
        if self.start {
            Mode::StartLast
        } else if self.stop {
            Mode::Stop
        } else if self.status {
            Mode::Status
        } else if self.log {
            Mode::Log
        } else {
            Mode::Interactive
        }
    }
}

/// Parse command-line arguments into the requested mode
fn parse_mode<I, T>(args: I) -> Result<Mode, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(|cli| cli.mode())
}

fn run(mode: Mode) -> Result<(), ZvpnError> {
    cli::preflight::ensure_privileged()?;

    let settings = load_settings()?;
    cli::preflight::ensure_client_installed(&settings.client_binary)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let config_dir = resolve_config_dir(&settings)?;
    cli::bootstrap::ensure_config_dir(&config_dir, &mut input, &mut output)?;

    let store = StateStore::new(
        config_dir,
        settings.pid_file.clone(),
        settings.log_file.clone(),
    );
    let supervisor = ProcessSupervisor::new(store, SystemProcessControl::new(), settings);
    CommandRouter::new(supervisor).run(mode, &mut input, &mut output)
}

fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let mode = match parse_mode(std::env::args_os()) {
        Ok(mode) => mode,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!(
                "{} Unknown argument. Use --start, --stop, --status, or --log.",
                "error:".red().bold()
            );
            std::process::exit(2);
        }
    };

    match run(mode) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(e.exit_code());
        }
    }
}
