//! Configuration directory bootstrap
//!
//! Offers to create the configuration directory on first use.

use std::fs::DirBuilder;
use std::io::{BufRead, Write};
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use tracing::info;
use zvpn_core::error::{PreconditionError, ZvpnError};

/// Make sure `path` exists, asking the operator before creating it
pub fn ensure_config_dir<R, W>(path: &Path, input: &mut R, output: &mut W) -> Result<(), ZvpnError>
where
    R: BufRead,
    W: Write,
{
    if path.is_dir() {
        return Ok(());
    }

    write!(
        output,
        "Configuration directory {} does not exist. Do you want to create it? (yes/no): ",
        path.display()
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    if !matches!(answer.trim().to_lowercase().as_str(), "yes" | "y") {
        return Err(PreconditionError::ConfigDirDeclined {
            path: path.to_path_buf(),
        }
        .into());
    }

    DirBuilder::new().mode(0o755).create(path)?;
    info!("Created configuration directory {:?}", path);
    writeln!(output, "Configuration directory created: {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_existing_dir_needs_no_prompt() {
        let temp_dir = tempdir().unwrap();
        let mut input = "".as_bytes();
        let mut output = Vec::new();

        ensure_config_dir(temp_dir.path(), &mut input, &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_yes_creates_dir() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(".zvpn");
        let mut input = "YES\n".as_bytes();
        let mut output = Vec::new();

        ensure_config_dir(&path, &mut input, &mut output).unwrap();
        assert!(path.is_dir());
        assert!(String::from_utf8(output)
            .unwrap()
            .ends_with(&format!("Configuration directory created: {}\n", path.display())));
    }

    #[test]
    fn test_decline_leaves_nothing() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(".zvpn");
        let mut input = "no\n".as_bytes();
        let mut output = Vec::new();

        let result = ensure_config_dir(&path, &mut input, &mut output);
        assert!(matches!(
            result,
            Err(ZvpnError::Precondition(PreconditionError::ConfigDirDeclined { .. }))
        ));
        assert!(!path.exists());
    }
}
