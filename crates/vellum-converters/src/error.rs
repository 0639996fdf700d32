//! Errors raised at the converter boundary: parse failures are fatal at the
//! point they're encountered, IO failures at `dump` time are fatal; both are
//! reported with enough context to point at a location.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a [`crate::Converter`] implementation can raise.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The manifest text didn't match the format's grammar.
    #[error("parse error in {format} manifest{}: {message}", location.as_ref().map_or_else(String::new, |l| format!(" at {l}")))]
    Parse {
        format: &'static str,
        location: Option<String>,
        message: String,
    },

    /// `dumps` was asked to serialize something the format cannot represent
    /// (e.g. a VCS link in a format with no such concept).
    #[error("{format} cannot represent: {message}")]
    Unrepresentable { format: &'static str, message: String },

    /// The format is read-only (e.g. the installed-packages inspector) and
    /// `dumps` was called anyway.
    #[error("{format} is a read-only format and cannot be written")]
    ReadOnly { format: &'static str },

    /// IO failure reading or writing a manifest path.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Version(#[from] vellum_core::version::ParseError),

    #[error(transparent)]
    Marker(#[from] vellum_core::marker::ParseError),

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("TOML serialize error: {0}")]
    TomlSer(String),

    #[error("JSON error: {0}")]
    Json(#[from] sonic_rs::Error),
}

impl ConverterError {
    #[must_use]
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            location: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn parse_at(format: &'static str, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            location: Some(location.into()),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
