//! VCS repository: a single synthetic [`Release`] per `(url, reference)`
//! pair, introspected by checking the ref out to a temp dir and reading the
//! package's own manifest there.

use crate::manifest_read::{read_project_manifest, synthetic_version, wire_declared};
use std::sync::Arc;
use vellum_core::error::RepoError;
use vellum_resolver::declaration::VcsKind;
use vellum_resolver::dependency::Dependency;
use vellum_resolver::release::{Origin, Release};
use vellum_resolver::Repository;
use vellum_vcs::VcsManager;

#[derive(Debug)]
pub struct VcsRepository {
    kind: VcsKind,
    url: String,
    reference: String,
    manager: Arc<VcsManager>,
    /// Repository every sub-dependency introspected from the checkout
    /// resolves against (typically the same aggregate used for the rest of
    /// the graph).
    sub_repo: Arc<dyn Repository>,
}

impl VcsRepository {
    #[must_use]
    pub fn new(
        kind: VcsKind,
        url: impl Into<String>,
        reference: impl Into<String>,
        manager: Arc<VcsManager>,
        sub_repo: Arc<dyn Repository>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            reference: reference.into(),
            manager,
            sub_repo,
        }
    }
}

impl Repository for VcsRepository {
    fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError> {
        let checkout = self.manager.checkout(self.kind, &self.url, &self.reference)?;
        let project = read_project_manifest(&checkout.path)?;
        let version = synthetic_version(&project);
        let dependencies = wire_declared(&project, name, &self.sub_repo);
        Ok(vec![Release::new(
            name,
            version,
            dependencies,
            Vec::new(),
            Vec::new(),
            Origin::Vcs {
                kind: self.kind,
                url: self.url.clone(),
                reference: checkout.resolved_commit,
            },
        )])
    }

    fn get_dependencies(&self, release: &Release) -> Result<Vec<Dependency>, RepoError> {
        Ok(release.dependencies().to_vec())
    }
}
