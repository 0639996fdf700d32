//! The file-layer shape of configuration, and the fully resolved config the
//! rest of vellum actually consumes.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Minimum stability a candidate release must meet to be considered without
/// an explicit pre-release-accepting specifier. Inclusion of pre-releases is
/// normally a property of the per-range `RangeSpecifier`; this is the
/// ambient, config-level default that seeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum MinimumStability {
    #[default]
    Stable,
    Beta,
    Alpha,
    Dev,
}

impl MinimumStability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
            Self::Dev => "dev",
        }
    }

    /// `true` if this stability floor already admits pre-releases, i.e. the
    /// per-range default of excluding them should be overridden.
    #[must_use]
    pub const fn admits_prereleases(self) -> bool {
        !matches!(self, Self::Stable)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "stable" => Ok(Self::Stable),
            "beta" => Ok(Self::Beta),
            "alpha" => Ok(Self::Alpha),
            "dev" => Ok(Self::Dev),
            other => Err(ConfigError::InvalidStability(other.to_string())),
        }
    }
}

/// One config layer as read off disk: every field optional, since a layer
/// only overrides what it sets. Scoped to what the resolver and
/// repositories actually need, not a full package-manager surface.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    pub cache_dir: Option<PathBuf>,
    pub cache_vcs_dir: Option<PathBuf>,
    pub network_timeout_secs: Option<u64>,
    pub minimum_stability: Option<String>,
    pub index_url: Option<String>,
    pub extra_index_urls: Option<Vec<String>>,
    pub offline: Option<bool>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

/// Fully merged configuration, after defaults, file layers, and environment
/// variables have all been applied, including the VCS clone cache and HTTP
/// cache directories.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub cache_dir: PathBuf,
    pub cache_vcs_dir: PathBuf,
    pub network_timeout_secs: u64,
    pub minimum_stability: MinimumStability,
    pub index_url: String,
    pub extra_index_urls: Vec<String>,
    pub offline: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let base = directories::ProjectDirs::from("", "", "vellum")
            .map_or_else(std::env::temp_dir, |d| d.cache_dir().to_path_buf());
        Self {
            cache_vcs_dir: base.join("vcs"),
            cache_dir: base,
            network_timeout_secs: 30,
            minimum_stability: MinimumStability::Stable,
            index_url: "https://index.example.test/simple".to_string(),
            extra_index_urls: Vec::new(),
            offline: false,
        }
    }
}
