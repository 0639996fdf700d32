//! Local-path repository: a package whose source is a directory already on
//! disk rather than an index entry (`Declaration::LocalPath`). Exactly one
//! synthetic release, since there is only ever one version of "whatever is
//! in this directory right now".

use crate::manifest_read::{read_project_manifest, synthetic_version, wire_declared};
use std::path::PathBuf;
use std::sync::Arc;
use vellum_core::error::RepoError;
use vellum_resolver::dependency::Dependency;
use vellum_resolver::release::{Origin, Release};
use vellum_resolver::Repository;

#[derive(Debug)]
pub struct LocalPathRepository {
    path: PathBuf,
    /// Repository every declared dependency of the local project resolves
    /// sub-dependencies against (typically the same aggregate the caller
    /// built for the rest of the graph).
    sub_repo: Arc<dyn Repository>,
}

impl LocalPathRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, sub_repo: Arc<dyn Repository>) -> Self {
        Self { path: path.into(), sub_repo }
    }
}

impl Repository for LocalPathRepository {
    fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError> {
        let project = read_project_manifest(&self.path)?;
        let version = synthetic_version(&project);
        let dependencies = wire_declared(&project, name, &self.sub_repo);
        Ok(vec![Release::new(
            name,
            version,
            dependencies,
            Vec::new(),
            Vec::new(),
            Origin::Local { path: self.path.to_string_lossy().into_owned() },
        )])
    }

    fn get_dependencies(&self, release: &Release) -> Result<Vec<Dependency>, RepoError> {
        Ok(release.dependencies().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vellum_core::error::RepoError as _;

    #[derive(Debug)]
    struct EmptyRepo;
    impl Repository for EmptyRepo {
        fn list_releases(&self, _name: &str) -> Result<Vec<Release>, RepoError> {
            Ok(Vec::new())
        }
        fn get_dependencies(&self, _release: &Release) -> Result<Vec<Dependency>, RepoError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn reads_pyproject_and_returns_single_release() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("pyproject.toml")).unwrap();
        writeln!(f, "[project]\nname = \"demo\"\nversion = \"1.2.3\"\ndependencies = [\"requests>=2.0\"]").unwrap();

        let repo = LocalPathRepository::new(dir.path(), Arc::new(EmptyRepo));
        let releases = repo.list_releases("demo").unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].dependencies().len(), 1);
    }

    #[test]
    fn missing_manifest_errors() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalPathRepository::new(dir.path(), Arc::new(EmptyRepo));
        assert!(repo.list_releases("demo").is_err());
    }
}
