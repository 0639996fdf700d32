//! Hierarchical config merge: built-in defaults, then an optional config
//! file, then environment variables, trimmed to the handful of settings the
//! resolver and repository layer need.

use crate::env::EnvConfig;
use crate::error::{ConfigError, Result};
use crate::types::{FileConfig, MinimumStability, ResolvedConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads and merges configuration for one process invocation.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env: EnvConfig,
}

impl ConfigLoader {
    /// `config_path`, if given, is read as a TOML file and layered between
    /// defaults and the environment.
    #[must_use]
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            env: EnvConfig::from_env(),
        }
    }

    /// Convenience constructor that reads `VELLUM_*` variables only, no
    /// config file.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(None)
    }

    fn read_file(&self) -> Result<Option<FileConfig>> {
        let Some(path) = &self.config_path else {
            return Ok(None);
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file present, using defaults");
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed: FileConfig = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.clone(),
            source,
        })?;
        Ok(Some(parsed))
    }

    /// Merge defaults, the config file (if any), and environment variables
    /// into one [`ResolvedConfig`].
    ///
    /// # Errors
    /// [`ConfigError::Io`]/[`ConfigError::Toml`] if a configured file exists
    /// but can't be read or parsed; [`ConfigError::InvalidStability`] if a
    /// `minimum-stability` value (file or env) isn't recognized.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut resolved = ResolvedConfig::default();

        if let Some(file) = self.read_file()? {
            apply_file(&mut resolved, &file)?;
        }
        self.apply_env(&mut resolved)?;

        Ok(resolved)
    }

    fn apply_env(&self, resolved: &mut ResolvedConfig) -> Result<()> {
        if let Some(dir) = &self.env.cache_dir {
            resolved.cache_vcs_dir = dir.join("vcs");
            resolved.cache_dir.clone_from(dir);
        }
        if let Some(timeout) = self.env.network_timeout_secs {
            resolved.network_timeout_secs = timeout;
        }
        if let Some(stability) = &self.env.minimum_stability {
            resolved.minimum_stability = MinimumStability::parse(stability)?;
        }
        if let Some(url) = &self.env.index_url {
            resolved.index_url.clone_from(url);
        }
        resolved.offline = resolved.offline || self.env.offline;
        Ok(())
    }

    #[must_use]
    pub const fn env(&self) -> &EnvConfig {
        &self.env
    }
}

fn apply_file(resolved: &mut ResolvedConfig, file: &FileConfig) -> Result<()> {
    if let Some(dir) = &file.cache_dir {
        resolved.cache_dir.clone_from(dir);
    }
    if let Some(dir) = &file.cache_vcs_dir {
        resolved.cache_vcs_dir.clone_from(dir);
    } else if let Some(dir) = &file.cache_dir {
        resolved.cache_vcs_dir = dir.join("vcs");
    }
    if let Some(timeout) = file.network_timeout_secs {
        resolved.network_timeout_secs = timeout;
    }
    if let Some(stability) = &file.minimum_stability {
        resolved.minimum_stability = MinimumStability::parse(stability)?;
    }
    if let Some(url) = &file.index_url {
        resolved.index_url.clone_from(url);
    }
    if let Some(extra) = &file.extra_index_urls {
        resolved.extra_index_urls.clone_from(extra);
    }
    if let Some(offline) = file.offline {
        resolved.offline = offline;
    }
    Ok(())
}

/// Default global config file location: `<config dir>/vellum/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vellum").map(|d| d.config_dir().join("config.toml"))
}

/// Resolve `path` relative to a project root if it isn't already absolute,
/// the rule applied to manifest-relative settings.
#[must_use]
pub fn resolve_relative(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}
