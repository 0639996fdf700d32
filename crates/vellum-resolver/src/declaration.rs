//! Tagged variants for a single dependency declaration, as parsed out of a
//! manifest's schemaless mapping.
//!
//! A raw manifest entry is one of: a bare version range, an inline table
//! with extras/markers, a VCS reference, a local path, or a downloadable
//! archive. Converters parse into this enum explicitly rather than carrying
//! the source format's dynamic mapping through the resolver. Whitespace- and
//! comment-preserving formats (`pipfile.rs`'s `toml_edit::DocumentMut`)
//! round-trip unrecognized keys by editing the prior document in place
//! rather than rebuilding it from this enum; formats that serialize a fixed
//! `serde` struct (`lockfile.rs`, `manifest.rs`) do not.

/// How a single dependency was declared in its source manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// A plain version range, e.g. `>=2.0,<3`.
    Version(String),
    /// A VCS checkout: `git`, `hg`, `svn`, or `bzr`.
    Vcs {
        kind: VcsKind,
        url: String,
        reference: String,
        subdirectory: Option<String>,
    },
    /// A local filesystem path (editable or not).
    LocalPath { path: String, editable: bool },
    /// A downloadable archive / direct URL reference.
    Archive { url: String, hashes: Vec<String> },
}

/// Which VCS a [`Declaration::Vcs`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Hg,
    Svn,
    Bzr,
}

impl VcsKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
            Self::Svn => "svn",
            Self::Bzr => "bzr",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "git" => Some(Self::Git),
            "hg" => Some(Self::Hg),
            "svn" => Some(Self::Svn),
            "bzr" => Some(Self::Bzr),
            _ => None,
        }
    }
}

impl Declaration {
    /// The `vcs+url@ref` link string used across converters and matched
    /// against `Requirement`'s `link` field.
    #[must_use]
    pub fn link_string(&self) -> Option<String> {
        match self {
            Self::Vcs {
                kind,
                url,
                reference,
                ..
            } => Some(format!("{}+{url}@{reference}", kind.as_str())),
            Self::LocalPath { path, .. } => Some(format!("file+{path}")),
            Self::Archive { url, .. } => Some(url.clone()),
            Self::Version(_) => None,
        }
    }
}
