//! Shared checkout result type. `VcsKind` itself is
//! [`vellum_resolver::declaration::VcsKind`] — this crate consumes it
//! rather than redeclaring it, since the declaration grammar and the
//! client dispatch must never disagree on which systems exist.

use std::path::PathBuf;

pub use vellum_resolver::declaration::VcsKind;

/// The result of checking a `(url, reference)` pair out to a local
/// directory: the directory itself, plus whatever the client resolved the
/// reference to (a commit sha for git, a global revision id for hg/bzr, a
/// revision number for svn).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub path: PathBuf,
    pub resolved_commit: String,
}
