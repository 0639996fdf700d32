//! Well-known environment variables recognized by the config layer, scoped
//! to what the resolver/repository layer reads.

use std::path::PathBuf;

/// A `VELLUM_*` environment variable this layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VellumEnvVar {
    /// `VELLUM_CACHE_DIR` - overrides the HTTP/VCS cache root.
    CacheDir,
    /// `VELLUM_NETWORK_TIMEOUT` - per-call repository timeout, in seconds.
    NetworkTimeout,
    /// `VELLUM_MINIMUM_STABILITY` - stability floor (stable/beta/alpha/dev).
    MinimumStability,
    /// `VELLUM_INDEX_URL` - primary index base URL.
    IndexUrl,
    /// `VELLUM_OFFLINE` - disable network repository calls entirely.
    Offline,
}

impl VellumEnvVar {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CacheDir => "VELLUM_CACHE_DIR",
            Self::NetworkTimeout => "VELLUM_NETWORK_TIMEOUT",
            Self::MinimumStability => "VELLUM_MINIMUM_STABILITY",
            Self::IndexUrl => "VELLUM_INDEX_URL",
            Self::Offline => "VELLUM_OFFLINE",
        }
    }

    #[must_use]
    pub fn get(self) -> Option<String> {
        std::env::var(self.as_str()).ok()
    }
}

/// Snapshot of every recognized `VELLUM_*` variable at process start.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub cache_dir: Option<PathBuf>,
    pub network_timeout_secs: Option<u64>,
    pub minimum_stability: Option<String>,
    pub index_url: Option<String>,
    pub offline: bool,
}

impl EnvConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cache_dir: VellumEnvVar::CacheDir.get().map(PathBuf::from),
            network_timeout_secs: VellumEnvVar::NetworkTimeout.get().and_then(|v| v.parse().ok()),
            minimum_stability: VellumEnvVar::MinimumStability.get(),
            index_url: VellumEnvVar::IndexUrl.get(),
            offline: VellumEnvVar::Offline
                .get()
                .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")),
        }
    }
}
