//! Aggregate repository: a fallback chain queried in order, first
//! non-empty answer wins.

use std::sync::Arc;
use vellum_core::error::RepoError;
use vellum_resolver::dependency::Dependency;
use vellum_resolver::release::Release;
use vellum_resolver::Repository;

/// Queries each member repository in order and returns the first one that
/// has any releases for the requested name. `get_dependencies` is forwarded
/// to whichever repository this same release actually belongs to isn't
/// tracked — every [`Release`] already carries its own sub-dependencies
/// fetched at `list_releases` time, so `get_dependencies` here just echoes
/// them back, same as every other `Repository` implementation in this
/// crate.
#[derive(Debug)]
pub struct AggregateRepository {
    members: Vec<Arc<dyn Repository>>,
}

impl AggregateRepository {
    #[must_use]
    pub fn new(members: Vec<Arc<dyn Repository>>) -> Self {
        Self { members }
    }
}

impl Repository for AggregateRepository {
    fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError> {
        let mut last_err = None;
        for member in &self.members {
            match member.list_releases(name) {
                Ok(releases) if !releases.is_empty() => return Ok(releases),
                Ok(_) => continue,
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    fn get_dependencies(&self, release: &Release) -> Result<Vec<Dependency>, RepoError> {
        Ok(release.dependencies().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::Version;
    use vellum_resolver::release::Origin;

    #[derive(Debug)]
    struct FixedRepo {
        name: &'static str,
        versions: Vec<&'static str>,
    }

    impl Repository for FixedRepo {
        fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError> {
            if name != self.name {
                return Ok(Vec::new());
            }
            Ok(self
                .versions
                .iter()
                .map(|v| {
                    Release::new(
                        name,
                        Version::parse(v).unwrap(),
                        vec![],
                        vec![],
                        vec![],
                        Origin::Index { url: "https://example.test".to_string() },
                    )
                })
                .collect())
        }

        fn get_dependencies(&self, _release: &Release) -> Result<Vec<Dependency>, RepoError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn falls_through_to_second_member() {
        let a: Arc<dyn Repository> = Arc::new(FixedRepo { name: "bar", versions: vec!["1.0"] });
        let b: Arc<dyn Repository> = Arc::new(FixedRepo { name: "foo", versions: vec!["2.0"] });
        let agg = AggregateRepository::new(vec![a, b]);
        let releases = agg.list_releases("foo").unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].version(), &Version::parse("2.0").unwrap());
    }

    #[test]
    fn unknown_name_returns_empty_not_error() {
        let a: Arc<dyn Repository> = Arc::new(FixedRepo { name: "bar", versions: vec!["1.0"] });
        let agg = AggregateRepository::new(vec![a]);
        assert!(agg.list_releases("nope").unwrap().is_empty());
    }
}
