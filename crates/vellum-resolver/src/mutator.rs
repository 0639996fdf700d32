//! Chooses the next `(dependency, candidate release)` pair to try.
//!
//! Deterministic tie-breaks:
//! 1. Prefer the Dependency with the fewest remaining candidates
//!    (most-constrained-variable).
//! 2. Among a Dependency's candidates, prefer the highest version.
//! 3. A release already tried and rejected at the current level is skipped.

use crate::graph::Graph;
use crate::release::Release;
use vellum_core::AHashMap;
use vellum_core::Version;

/// Per-level memory of `(canonical_name, version)` pairs already tried and
/// rejected, so the resolver never revisits the same decision twice at the
/// same level.
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    tried: AHashMap<usize, std::collections::HashSet<(String, Version)>>,
}

impl Mutator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `(name, version)` was tried and rejected at `level`.
    pub fn mark_tried(&mut self, level: usize, name: &str, version: Version) {
        self.tried
            .entry(level)
            .or_default()
            .insert((name.to_string(), version));
    }

    /// Forget everything tried at `level`, called when the resolver
    /// backtracks away from it; cleared only when backtracking past the
    /// level that recorded them.
    pub fn clear_level(&mut self, level: usize) {
        self.tried.remove(&level);
    }

    fn was_tried(&self, level: usize, name: &str, version: &Version) -> bool {
        self.tried
            .get(&level)
            .is_some_and(|set| set.contains(&(name.to_string(), version.clone())))
    }

    /// Pick the next decision at `level`, or `None` if every unapplied
    /// Dependency has already exhausted its untried candidates (signaling
    /// the Resolver must backtrack).
    #[must_use]
    pub fn mutate(&self, graph: &Graph, level: usize) -> Option<(String, Release)> {
        let mut best: Option<(&str, Vec<&Release>)> = None;

        for node in graph.nodes() {
            if node.dependency.is_applied() {
                continue;
            }
            let available = node.available_versions();
            let satisfying = node.dependency.constraint().filter(&available);
            let untried: Vec<&Release> = node
                .releases
                .iter()
                .filter(|r| satisfying.contains(r.version()) && !self.was_tried(level, node.dependency.canonical_name(), r.version()))
                .collect();
            if untried.is_empty() {
                continue;
            }
            let is_better = match &best {
                None => true,
                // Most-constrained-variable first; ties broken by canonical
                // name so the decision doesn't depend on the graph's
                // (hash-seeded) node iteration order.
                Some((current_name, current)) => {
                    untried.len() < current.len()
                        || (untried.len() == current.len() && node.dependency.canonical_name() < *current_name)
                }
            };
            if is_better {
                best = Some((node.dependency.canonical_name(), untried));
            }
        }

        let (name, mut candidates) = best?;
        candidates.sort_by(|a, b| b.version().cmp(a.version()));
        let release = candidates.first().copied()?.clone();
        Some((name.to_string(), release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, RootDependency};
    use crate::release::Origin;
    use crate::repository::Repository;
    use std::sync::Arc;
    use vellum_core::error::RepoError;

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

    fn releases_for(name: &str, versions: &[&str]) -> Vec<Release> {
        versions
            .iter()
            .map(|v| {
                Release::new(
                    name,
                    Version::parse(v).unwrap(),
                    vec![],
                    vec![],
                    vec![],
                    Origin::Index {
                        url: "https://example.test".to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn prefers_highest_untried_version() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        let mut dep = Dependency::new("foo", repo);
        let releases = releases_for("foo", &["1.0", "2.0", "3.0"]);
        dep.constraint_mut()
            .attach("root", ">=1.0", &releases.iter().map(|r| r.version().clone()).collect::<Vec<_>>())
            .unwrap();
        graph.add(dep, 1, releases);

        let mutator = Mutator::new();
        let (name, release) = mutator.mutate(&graph, 1).unwrap();
        assert_eq!(name, "foo");
        assert_eq!(release.version(), &Version::parse("3.0").unwrap());
    }

    #[test]
    fn skips_tried_releases() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        let mut dep = Dependency::new("foo", repo);
        let releases = releases_for("foo", &["1.0", "2.0"]);
        dep.constraint_mut()
            .attach("root", ">=1.0", &releases.iter().map(|r| r.version().clone()).collect::<Vec<_>>())
            .unwrap();
        graph.add(dep, 1, releases);

        let mut mutator = Mutator::new();
        mutator.mark_tried(1, "foo", Version::parse("2.0").unwrap());
        let (_, release) = mutator.mutate(&graph, 1).unwrap();
        assert_eq!(release.version(), &Version::parse("1.0").unwrap());
    }

    #[test]
    fn most_constrained_dependency_chosen_first() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);

        let mut wide = Dependency::new("wide", repo.clone());
        let wide_releases = releases_for("wide", &["1.0", "2.0", "3.0"]);
        wide.constraint_mut()
            .attach("root", ">=1.0", &wide_releases.iter().map(|r| r.version().clone()).collect::<Vec<_>>())
            .unwrap();
        graph.add(wide, 1, wide_releases);

        let mut narrow = Dependency::new("narrow", repo);
        let narrow_releases = releases_for("narrow", &["1.0"]);
        narrow
            .constraint_mut()
            .attach("root", ">=1.0", &narrow_releases.iter().map(|r| r.version().clone()).collect::<Vec<_>>())
            .unwrap();
        graph.add(narrow, 1, narrow_releases);

        let mutator = Mutator::new();
        let (name, _) = mutator.mutate(&graph, 1).unwrap();
        assert_eq!(name, "narrow");
    }

    #[test]
    fn ties_break_on_canonical_name_regardless_of_insertion_order() {
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        for (first, second) in [("zeta", "alpha"), ("alpha", "zeta")] {
            let mut graph = Graph::new(RootDependency::new("root"));
            for name in [first, second] {
                let mut dep = Dependency::new(name, repo.clone());
                let releases = releases_for(name, &["1.0", "2.0"]);
                dep.constraint_mut()
                    .attach("root", ">=1.0", &releases.iter().map(|r| r.version().clone()).collect::<Vec<_>>())
                    .unwrap();
                graph.add(dep, 1, releases);
            }
            let mutator = Mutator::new();
            let (name, _) = mutator.mutate(&graph, 1).unwrap();
            assert_eq!(name, "alpha", "insertion order {first}, {second} must not affect the tie-break");
        }
    }
}
