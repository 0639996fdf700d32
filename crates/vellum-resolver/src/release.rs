//! A concrete candidate: a package name at a specific version, together with
//! its own declared (unresolved) dependencies.

use crate::dependency::Dependency;
use vellum_core::Version;

/// Where a [`Release`]'s bytes ultimately come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Fetched from an index repository at this URL.
    Index { url: String },
    /// A local filesystem path or archive.
    Local { path: String },
    /// Checked out from a VCS at a specific ref.
    Vcs {
        kind: crate::declaration::VcsKind,
        url: String,
        reference: String,
    },
}

/// An immutable, already-fetched candidate version of a package.
#[derive(Debug, Clone)]
pub struct Release {
    name: String,
    version: Version,
    dependencies: Vec<Dependency>,
    extras: Vec<String>,
    hashes: Vec<String>,
    origin: Origin,
}

impl Release {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: Version,
        dependencies: Vec<Dependency>,
        extras: Vec<String>,
        hashes: Vec<String>,
        origin: Origin,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies,
            extras,
            hashes,
            origin,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    #[must_use]
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    #[must_use]
    pub fn hashes(&self) -> &[String] {
        &self.hashes
    }

    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}
impl Eq for Release {}

/// A release whose source is a VCS ref rather than an index entry: exactly
/// one synthetic release per `(url, ref)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRelease {
    pub name: String,
    pub url: String,
    pub reference: String,
    pub resolved_commit: Option<String>,
}

impl GitRelease {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            reference: reference.into(),
            resolved_commit: None,
        }
    }

    /// The `vcs+url@ref` link string used across converters' requirement
    /// round-trips.
    #[must_use]
    pub fn link(&self) -> String {
        format!("git+{}@{}", self.url, self.reference)
    }
}
