//! Shared error types for vellum operations.
//!
//! Every crate in the workspace defines its own `thiserror::Error` enum for
//! its own concerns; this module defines the handful of error kinds that cut
//! across crate boundaries (a repository failure surfacing through the
//! resolver, a conflict report reaching the CLI) so they don't need
//! re-wrapping at every hop.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type threaded between `vellum-resolver`,
/// `vellum-repository`, and `vellum-cli`.
#[derive(Debug, Error)]
pub enum Error {
    /// A version, specifier, or marker string failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A repository failed to answer a metadata or fetch request.
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    /// The resolver exhausted its search space without finding a
    /// satisfying assignment.
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// The operation was cancelled (e.g. the CLI's Ctrl-C handler fired).
    #[error("operation cancelled")]
    Cancelled,

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout `vellum-core` and its dependents.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing a version, specifier, range, canonical name,
/// or marker expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Version(#[from] crate::version::ParseError),

    #[error(transparent)]
    Marker(#[from] crate::marker::ParseError),

    /// A manifest or lockfile document could not be deserialized.
    #[error("invalid document at {path}: {message}")]
    Document { path: String, message: String },
}

/// Errors raised by a [`Repository`](crate) implementation: index lookups,
/// VCS clones, local path reads, and the aggregate that fans requests out
/// across all three.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No configured repository has ever heard of this package.
    #[error("package not found: {name}")]
    PackageNotFound { name: String },

    /// The package is known but has no release matching any usable
    /// version.
    #[error("no matching version for {name}: {reason}")]
    NoMatchingVersion { name: String, reason: String },

    /// The network or VCS client reported a transport failure.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// A downloaded artifact's checksum didn't match the recorded one.
    #[error("checksum mismatch for {name}@{version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    /// A VCS client invocation (`git`, `hg`, `svn`, `bzr`) exited non-zero.
    #[error("vcs command `{command}` failed: {message}")]
    VcsCommand { command: String, message: String },

    /// A local-path repository's directory is missing or unreadable.
    #[error("local repository path not usable: {path}")]
    LocalPath { path: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A fully rendered conflict, as produced by the resolver's conflict
/// analyzer when no assignment satisfies every constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not resolve dependencies:\n{report}")]
pub struct ConflictError {
    /// A human-readable explanation assembled from the chain of decisions
    /// and backtracks that led to exhaustion, following the "explain why,
    /// not just that" guidance for resolver failures.
    pub report: String,
}

impl ConflictError {
    /// Build a conflict error from a pre-rendered report string.
    #[must_use]
    pub fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_error_renders_report() {
        let err = ConflictError::new("foo requires bar >=2.0 but bar 1.0 is the only release");
        assert!(err.to_string().contains("foo requires bar"));
    }

    #[test]
    fn parse_error_wraps_version_error() {
        let version_err = crate::version::ParseError::InvalidVersion("???".to_string());
        let err: ParseError = version_err.into();
        assert!(err.to_string().contains("invalid version"));
    }

    #[test]
    fn repo_error_package_not_found_message() {
        let err = RepoError::PackageNotFound {
            name: "requests".to_string(),
        };
        assert_eq!(err.to_string(), "package not found: requests");
    }

    #[test]
    fn top_level_error_from_conversions() {
        let conflict = ConflictError::new("unsatisfiable");
        let err: Error = conflict.into();
        assert!(matches!(err, Error::Conflict(_)));
    }
}
