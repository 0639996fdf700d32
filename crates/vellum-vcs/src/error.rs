//! Errors raised invoking a VCS client.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git error cloning {url}: {message}")]
    Git { url: String, message: String },

    /// A shelled-out `hg`/`svn`/`bzr` invocation exited non-zero.
    #[error("`{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("`{command}` is not installed on PATH")]
    ClientNotFound { command: String },

    #[error("checkout destination not usable: {path}")]
    BadDestination { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VcsError>;

impl From<VcsError> for vellum_core::error::RepoError {
    fn from(err: VcsError) -> Self {
        match err {
            VcsError::Git { url, message } => vellum_core::error::RepoError::Network { url, message },
            VcsError::CommandFailed { command, stderr, .. } => vellum_core::error::RepoError::VcsCommand { command, message: stderr },
            VcsError::ClientNotFound { command } => vellum_core::error::RepoError::VcsCommand {
                command,
                message: "client binary not found on PATH".to_string(),
            },
            VcsError::BadDestination { path } => vellum_core::error::RepoError::LocalPath { path },
            VcsError::Io(e) => vellum_core::error::RepoError::Io(e),
        }
    }
}
