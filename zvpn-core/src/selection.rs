//! Interactive configuration selection
//!
//! Lists candidate configuration files, asks the operator to pick one,
//! records the pick as the last used configuration and starts the client.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, error, warn};

use crate::config::SaveFailurePolicy;
use crate::error::{InputError, Result, ZvpnError};
use crate::process::supervisor::StartReport;
use crate::process::{ProcessControl, ProcessSupervisor};

/// Outcome of recording a choice and starting the client
#[derive(Debug)]
pub struct SelectionReport {
    /// Failure to write the last-config marker, when the start went ahead anyway
    pub save_error: Option<ZvpnError>,
    pub start: StartReport,
}

/// File names in `dir` ending with `suffix`, in directory enumeration order
///
/// Names that are not valid UTF-8 are skipped.
pub fn list_candidates(dir: &Path, suffix: &str) -> Result<Vec<String>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        match entry.file_name().into_string() {
            Ok(name) if name.ends_with(suffix) => candidates.push(name),
            Ok(_) => {}
            Err(raw) => debug!("Skipping non UTF-8 file name {:?}", raw),
        }
    }
    Ok(candidates)
}

/// Parse the leading integer of `line` as a 1-based choice among `count` items
///
/// Leading whitespace and an optional sign are accepted, trailing text is
/// ignored. Returns the 0-based index.
pub fn parse_choice(line: &str, count: usize) -> std::result::Result<usize, InputError> {
    let invalid = || InputError::InvalidChoice {
        input: line.trim().to_string(),
    };

    let trimmed = line.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(invalid());
    }

    let number: i64 = trimmed[..sign_len + digits_len]
        .parse()
        .map_err(|_| invalid())?;

    if number < 1 || number > count as i64 {
        return Err(invalid());
    }
    Ok(number as usize - 1)
}

/// Show a numbered menu of `candidates` and read one choice
pub fn prompt_choice<R, W>(candidates: &[String], input: &mut R, output: &mut W) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Select a configuration file to use:")?;
    for (i, name) in candidates.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, name)?;
    }
    write!(output, "Enter choice: ")?;
    output.flush()?;

    let mut raw = Vec::new();
    input.read_until(b'\n', &mut raw)?;
    let line = String::from_utf8(raw).map_err(|e| InputError::InvalidChoice {
        input: String::from_utf8_lossy(e.as_bytes()).trim().to_string(),
    })?;

    let index = parse_choice(&line, candidates.len())?;
    Ok(candidates[index].clone())
}

/// Record `chosen` as the last used configuration, then start the client with it
///
/// A failed marker write is reported; whether the start still happens is
/// decided by the `on_save_failure` setting.
pub fn record_and_start<C: ProcessControl>(
    supervisor: &ProcessSupervisor<C>,
    chosen: &str,
) -> Result<SelectionReport> {
    let store = supervisor.store();

    let save_error = match store.write_last_config(chosen) {
        Ok(()) => None,
        Err(e) => match supervisor.settings().on_save_failure {
            SaveFailurePolicy::Abort => {
                error!("Failed to save last used configuration: {}", e);
                return Err(e);
            }
            SaveFailurePolicy::Continue => {
                warn!("Failed to save last used configuration: {}", e);
                Some(e)
            }
        },
    };

    let start = supervisor.start(&store.config_dir().join(chosen))?;
    Ok(SelectionReport { save_error, start })
}
