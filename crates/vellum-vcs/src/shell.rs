//! Shared plumbing for the VCS clients that work by shelling out to a
//! native client binary (`hg`, `svn`, `bzr`) rather than linking a library,
//! since no pure-Rust client exists for any of the three.

use crate::error::{Result, VcsError};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run `command arg0 arg1 ...`, returning stdout on success.
///
/// # Errors
/// [`VcsError::ClientNotFound`] if the binary isn't on `PATH`;
/// [`VcsError::CommandFailed`] if it exits non-zero.
pub fn run(command: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    debug!(command, ?args, "shelling out to vcs client");
    let mut cmd = Command::new(command);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VcsError::ClientNotFound { command: command.to_string() }
        } else {
            VcsError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: command.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
