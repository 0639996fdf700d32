//! Dispatches a checkout request to the right native client by
//! [`VcsKind`], deduplicating concurrent requests for the same
//! `(url, reference)` pair through a shared [`VcsCloneCache`] so two
//! dependents of the same VCS package never clone it twice in one resolve.
//!
//! [`Repository::list_releases`](vellum_resolver::Repository::list_releases)
//! is a blocking call, but the clone cache underneath is async (it holds
//! the lock across the clone, not just around a map lookup);
//! [`VcsManager::checkout`] drives it with [`futures::executor::block_on`]
//! the same way the index repository drives its own async HTTP calls at
//! its synchronous boundary.

use crate::bzr::BzrClient;
use crate::error::{Result, VcsError};
use crate::git::GitClient;
use crate::hg::HgClient;
use crate::svn::SvnClient;
use crate::types::{Checkout, VcsKind};
use std::path::PathBuf;
use vellum_cache::{CloneKey, VcsCloneCache};

#[derive(Debug)]
pub struct VcsManager {
    workdir: PathBuf,
    git: GitClient,
    hg: HgClient,
    svn: SvnClient,
    bzr: BzrClient,
    cache: VcsCloneCache,
}

impl VcsManager {
    /// `workdir` is the root directory fresh checkouts are created under,
    /// typically the cache directory configured in `vellum-config`.
    #[must_use]
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            git: GitClient::new(),
            hg: HgClient::new(),
            svn: SvnClient::new(),
            bzr: BzrClient::new(),
            cache: VcsCloneCache::new(),
        }
    }

    /// Check `url` out at `reference` using the client for `kind`, reusing
    /// an existing checkout for the same `(url, reference)` pair if one is
    /// already cached.
    ///
    /// # Errors
    /// Whatever the underlying client returns; [`VcsError::BadDestination`]
    /// if a fresh checkout directory cannot be created.
    pub fn checkout(&self, kind: VcsKind, url: &str, reference: &str) -> Result<Checkout> {
        let key = CloneKey::new(url, reference);
        let dest = self.fresh_dest(url, reference);

        let path = futures::executor::block_on(self.cache.get_or_clone(key, || async {
            std::fs::create_dir_all(&dest).map_err(|_| VcsError::BadDestination { path: dest.clone() })?;
            let checkout = match kind {
                VcsKind::Git => self.git.checkout(url, reference, &dest)?,
                VcsKind::Hg => self.hg.checkout(url, reference, &dest)?,
                VcsKind::Svn => self.svn.checkout(url, reference, &dest)?,
                VcsKind::Bzr => self.bzr.checkout(url, reference, &dest)?,
            };
            Ok::<_, VcsError>(checkout.path)
        }))?;

        Ok(Checkout {
            path,
            resolved_commit: reference.to_string(),
        })
    }

    fn fresh_dest(&self, url: &str, reference: &str) -> PathBuf {
        let digest = blake3::hash(format!("{url}@{reference}").as_bytes());
        self.workdir.join(digest.to_hex().as_str())
    }
}
