//! The `Repository` abstraction: a source of releases for a package name.
//!
//! Implementations (index, VCS, local-path, aggregate) live in
//! `vellum-repository`; this crate only defines the contract the resolver
//! drives, since the resolver, Graph, and Dependency types all need to name
//! it. The resolver treats every call as a blocking, synchronous
//! round-trip even though an implementation may run concurrent I/O (e.g.
//! prefetching several candidates' metadata at once) behind it.

use crate::release::Release;
use vellum_core::error::RepoError;

/// A source of candidate releases for package names.
pub trait Repository: std::fmt::Debug + Send + Sync {
    /// List releases for `name`, descending by version, stable on ties.
    ///
    /// # Errors
    /// Returns [`RepoError`] on network/parse failure or if the name is
    /// entirely unknown to this repository.
    fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError>;

    /// Fetch `release`'s own declared sub-dependencies. Must be idempotent
    /// per release; may hit the network on first call and serve from cache
    /// thereafter.
    ///
    /// # Errors
    /// Returns [`RepoError`] on network/parse failure; the resolver treats
    /// this the same as the release being unresolvable and backtracks.
    fn get_dependencies(&self, release: &Release) -> Result<Vec<crate::dependency::Dependency>, RepoError>;
}
