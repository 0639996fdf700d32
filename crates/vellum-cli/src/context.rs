//! Wires a loaded project's declared dependencies to concrete
//! [`Repository`] instances: an index for plain version ranges, a
//! [`VcsRepository`] for VCS declarations, a [`LocalPathRepository`] for
//! local-path ones — built once per `convert` invocation and handed to
//! [`vellum_converters::convert`] as its [`RepositoryContext`].

use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use vellum_cache::HttpCache;
use vellum_config::ResolvedConfig;
use vellum_converters::RepositoryContext;
use vellum_repository::{IndexRepository, LocalPathRepository, VcsRepository};
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::RootDependency;
use vellum_resolver::Repository;
use vellum_vcs::VcsManager;

/// Per-name repository map built from one project's declared dependencies,
/// falling back to the primary index for any name not declared with a
/// VCS/local-path/archive link.
#[derive(Debug)]
pub struct CliRepositoryContext {
    index: Arc<dyn Repository>,
    by_name: HashMap<String, Arc<dyn Repository>>,
}

impl CliRepositoryContext {
    /// Build the context for `project`, using `config` for the index URL
    /// and the VCS clone-cache directory.
    #[must_use]
    pub fn build(project: &RootDependency, config: &ResolvedConfig) -> Self {
        let index: Arc<IndexRepository> = Arc::new(IndexRepository::new(config.index_url.clone(), Arc::new(HttpCache::new(1024))));
        IndexRepository::install_self(&index);
        let index: Arc<dyn Repository> = index;

        let vcs_manager = Arc::new(VcsManager::new(config.cache_vcs_dir.clone()));

        let mut by_name = HashMap::new();
        for declared in &project.declared {
            let repo: Arc<dyn Repository> = match &declared.declaration {
                Declaration::Version(_) => continue,
                Declaration::Vcs { kind, url, reference, .. } => {
                    Arc::new(VcsRepository::new(*kind, url.clone(), reference.clone(), vcs_manager.clone(), index.clone()))
                }
                Declaration::LocalPath { path, .. } => Arc::new(LocalPathRepository::new(path.clone(), index.clone())),
                Declaration::Archive { url, .. } => {
                    warn!(name = %declared.name, %url, "archive declarations resolve through the index by name; direct archive fetch is not yet a distinct repository variant");
                    index.clone()
                }
            };
            by_name.insert(vellum_core::canonicalize(&declared.name), repo);
        }

        Self { index, by_name }
    }
}

impl RepositoryContext for CliRepositoryContext {
    fn repository_for(&self, declared_name: &str) -> Arc<dyn Repository> {
        self.by_name
            .get(&vellum_core::canonicalize(declared_name))
            .cloned()
            .unwrap_or_else(|| self.index.clone())
    }
}
