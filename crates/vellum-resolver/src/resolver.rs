//! The backtracking search loop that drives a [`Graph`] to a fixed point.
//!
//! This is deliberately not a SAT/CDCL or PubGrub-style solver: it is a
//! level-indexed backtracking search with constant, explicit undo records,
//! matched against an explicit "tried" memory per level. Each level
//! corresponds to one dependency having been chosen and applied; a
//! conflict or an exhausted Mutator forces undoing the most recent level.

use crate::conflict::ConflictAnalyzer;
use crate::dependency::Dependency;
use crate::graph::Graph;
use crate::mutator::Mutator;
use crate::release::Release;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use vellum_core::error::{ConflictError, Error, Result};
use vellum_core::Environment;

/// A flag a caller can flip to abort an in-progress resolution between
/// mutation steps. Checked at the top of every loop iteration; never polled
/// on a timer.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Undo record for one applied level: which dependency was chosen, which
/// previously-absent nodes this choice introduced into the graph (to be
/// removed wholesale on backtrack), and which already-present nodes had a
/// new group attached (to be unapplied, not removed, on backtrack).
#[derive(Debug, Clone)]
struct LevelRecord {
    chosen: String,
    release: Release,
    introduced: Vec<String>,
    attached_to_existing: Vec<String>,
}

/// Drives one [`Graph`] to a fixed point: every node applied with a chosen
/// release, or a [`ConflictError`] naming why no assignment exists.
pub struct Resolver {
    env: Environment,
    mutator: Mutator,
    silent: bool,
    cancel: CancellationToken,
}

impl Resolver {
    #[must_use]
    pub fn new(env: Environment, silent: bool, cancel: CancellationToken) -> Self {
        Self {
            env,
            mutator: Mutator::new(),
            silent,
            cancel,
        }
    }

    fn report(&self, message: &str) {
        if self.silent {
            debug!("{message}");
        } else {
            info!("{message}");
        }
    }

    /// Resolve `graph` in place.
    ///
    /// # Errors
    /// [`Error::Cancelled`] if the token fires between mutation steps;
    /// [`Error::Conflict`] if the search space is exhausted without finding
    /// an assignment that satisfies every constraint.
    #[instrument(skip_all)]
    pub fn resolve(&mut self, graph: &mut Graph) -> Result<()> {
        let mut level: usize = 0;
        let mut history: Vec<LevelRecord> = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            if let Some(node) = graph.conflict() {
                let name = node.dependency.canonical_name().to_string();
                self.report(&format!("conflict on {name}, backtracking"));
                if !self.backtrack(graph, &mut history, &mut level) {
                    let report = ConflictAnalyzer::analyze(graph, &name);
                    return Err(ConflictError::new(report).into());
                }
                continue;
            }

            if graph.is_fully_resolved() {
                self.report("resolution complete");
                return Ok(());
            }

            match self.mutator.mutate(graph, level) {
                Some((name, release)) => {
                    self.report(&format!("trying {name} {}", release.version()));
                    self.apply_candidate(graph, &mut history, level, name, release);
                    level += 1;
                }
                None => {
                    self.report("no untried candidates remain at this level, backtracking");
                    if !self.backtrack(graph, &mut history, &mut level) {
                        let report = graph.nodes().find(|n| !n.dependency.is_applied()).map_or_else(
                            || "no candidates remain and no single conflicting package could be isolated".to_string(),
                            |n| ConflictAnalyzer::analyze(graph, n.dependency.canonical_name()),
                        );
                        return Err(ConflictError::new(report).into());
                    }
                }
            }
        }
    }

    /// Apply `release` for the dependency named `name`: choose it, mark it
    /// applied, and attach every sub-dependency it declares — creating new
    /// graph nodes for names not yet present, or merging another `Group`
    /// onto ones that are.
    fn apply_candidate(
        &mut self,
        graph: &mut Graph,
        history: &mut Vec<LevelRecord>,
        level: usize,
        name: String,
        release: Release,
    ) {
        let mut introduced = Vec::new();
        let mut attached_to_existing = Vec::new();

        let sub_deps: Vec<Dependency> = release.dependencies().to_vec();

        {
            let node = graph
                .get_by_name_mut(&name)
                .expect("mutator only returns names already present in the graph");
            node.dependency.choose(release.clone());
            node.dependency.set_applied(true);
            node.level = level;
        }

        for sub in sub_deps {
            if sub.is_excluded_by_marker(&self.env) {
                continue;
            }
            let canonical = sub.canonical_name().to_string();
            let requester = name.clone();
            let specifier_text = sub
                .constraint()
                .enabled_groups()
                .first()
                .map_or_else(|| "*".to_string(), |g| g.range().to_string());

            if graph.contains(&canonical) {
                let existing = graph
                    .get_by_name_mut(&canonical)
                    .expect("contains() just confirmed presence");
                let available = existing.available_versions();
                let _ = existing
                    .dependency
                    .constraint_mut()
                    .attach(&requester, &specifier_text, &available);
                attached_to_existing.push(canonical);
            } else {
                let repo = sub.repository().clone();
                let releases = repo.list_releases(&canonical).unwrap_or_default();
                let available: Vec<_> = releases.iter().map(|r| r.version().clone()).collect();
                let mut new_dep = Dependency::new(sub.name(), repo);
                new_dep.set_extras(sub.extras().to_vec());
                new_dep.set_marker(sub.marker().cloned());
                new_dep.set_link(sub.link().cloned());
                let _ = new_dep.constraint_mut().attach(&requester, &specifier_text, &available);
                graph.add(new_dep, level + 1, releases);
                introduced.push(canonical);
            }
        }

        history.push(LevelRecord {
            chosen: name,
            release,
            introduced,
            attached_to_existing,
        });
    }

    /// Undo the most recent level: remove nodes it introduced, unapply
    /// groups it attached to pre-existing nodes, unchoose its own
    /// dependency, prune anything left with no requesters, and mark the
    /// rejected release tried at the level we return to. Returns `false` if
    /// there is nothing left to undo (search space exhausted).
    fn backtrack(&mut self, graph: &mut Graph, history: &mut Vec<LevelRecord>, level: &mut usize) -> bool {
        let Some(record) = history.pop() else {
            return false;
        };

        for child in &record.introduced {
            graph.remove(child);
        }
        for child in &record.attached_to_existing {
            if let Some(node) = graph.get_by_name_mut(child) {
                node.dependency.constraint_mut().unapply(&record.chosen);
            }
        }
        if let Some(node) = graph.get_by_name_mut(&record.chosen) {
            node.dependency.unchoose();
            node.dependency.set_applied(false);
        }

        graph.prune_unreferenced();

        let departing_level = *level;
        *level = level.saturating_sub(1);
        self.mutator.mark_tried(*level, &record.chosen, record.release.version().clone());
        self.mutator.clear_level(departing_level);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{DeclaredDependency, RootDependency};
    use crate::release::Origin;
    use crate::repository::Repository;
    use vellum_core::error::RepoError;
    use vellum_core::Version;

    #[derive(Debug)]
    struct FixedRepo {
        releases: Vec<(String, Vec<&'static str>)>,
    }

    impl Repository for FixedRepo {
        fn list_releases(&self, name: &str) -> std::result::Result<Vec<Release>, RepoError> {
            let entry = self.releases.iter().find(|(n, _)| n == name);
            Ok(entry
                .map(|(n, versions)| {
                    versions
                        .iter()
                        .map(|v| {
                            Release::new(
                                n.clone(),
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
                })
                .unwrap_or_default())
        }

        fn get_dependencies(&self, _release: &Release) -> std::result::Result<Vec<Dependency>, RepoError> {
            Ok(Vec::new())
        }
    }

    fn graph_with_single_requirement(repo: Arc<dyn Repository>, name: &str, range: &str) -> Graph {
        let mut root = RootDependency::new("demo");
        root.declared.push(DeclaredDependency {
            name: name.to_string(),
            declaration: crate::declaration::Declaration::Version(range.to_string()),
            extras: vec![],
            marker: None,
            dev: false,
        });
        let mut graph = Graph::new(root);
        let releases = repo.list_releases(name).unwrap();
        let available: Vec<_> = releases.iter().map(|r| r.version().clone()).collect();
        let mut dep = Dependency::new(name, repo);
        dep.constraint_mut().attach("demo", range, &available).unwrap();
        graph.add(dep, 0, releases);
        graph
    }

    #[test]
    fn resolves_single_dependency_to_highest_match() {
        let repo: Arc<dyn Repository> = Arc::new(FixedRepo {
            releases: vec![("foo".to_string(), vec!["1.0", "1.5", "2.0"])],
        });
        let mut graph = graph_with_single_requirement(repo, "foo", "<2.0");
        let mut resolver = Resolver::new(Environment::default(), true, CancellationToken::new());
        resolver.resolve(&mut graph).unwrap();

        let node = graph.get_by_name("foo").unwrap();
        assert_eq!(node.dependency.chosen_release().unwrap().version(), &Version::parse("1.5").unwrap());
    }

    #[test]
    fn unsatisfiable_requirement_reports_conflict() {
        let repo: Arc<dyn Repository> = Arc::new(FixedRepo {
            releases: vec![("foo".to_string(), vec!["1.0"])],
        });
        let mut graph = graph_with_single_requirement(repo, "foo", ">=2.0");
        let mut resolver = Resolver::new(Environment::default(), true, CancellationToken::new());
        let err = resolver.resolve(&mut graph).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn cancellation_short_circuits_before_mutation() {
        let repo: Arc<dyn Repository> = Arc::new(FixedRepo {
            releases: vec![("foo".to_string(), vec!["1.0"])],
        });
        let mut graph = graph_with_single_requirement(repo, "foo", ">=1.0");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut resolver = Resolver::new(Environment::default(), true, cancel);
        let err = resolver.resolve(&mut graph).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
