//! Error type for configuration loading.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading, or parsing a configuration layer.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("reading config file {path}")]
    #[diagnostic(code(vellum_config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    #[diagnostic(code(vellum_config::parse), help("check the file's TOML syntax"))]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid minimum-stability value: {0}")]
    #[diagnostic(code(vellum_config::stability), help("use one of: stable, beta, alpha, dev"))]
    InvalidStability(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
