//! The final, flat projection out of a resolved [`Graph`]: one
//! [`Requirement`] per applied dependency, in the shape every converter's
//! `dumps` consumes.

use crate::graph::Graph;

/// One line of emitted output: either a pinned version (locking) or the
/// original declared range (manifest round-trip), plus everything a
/// converter needs to render it without reaching back into the Graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub canonical_name: String,
    /// An exact version string when `lock` was requested, otherwise the
    /// union specifier text the dependency's enabled groups settled on.
    pub version: String,
    pub extras: Vec<String>,
    pub marker: Option<String>,
    /// `vcs+url@ref` / `file+path` / archive URL, when this dependency came
    /// from something other than a plain index version.
    pub link: Option<String>,
    pub hashes: Vec<String>,
    pub is_editable: bool,
    pub is_dev: bool,
}

impl Requirement {
    /// Walk every applied node reachable in `graph`, sorted by canonical
    /// name (stable, case-insensitive), and flatten each into one
    /// [`Requirement`]. When `lock` is `true`, emit the exact resolved
    /// version and its hashes; otherwise emit the declared range text
    /// unchanged.
    #[must_use]
    pub fn from_graph(graph: &Graph, lock: bool) -> Vec<Self> {
        let mut names: Vec<&str> = graph.nodes().map(|n| n.dependency.canonical_name()).collect();
        names.sort_unstable();

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let Some(node) = graph.get_by_name(name) else { continue };
            let dep = &node.dependency;

            let declared_range = dep
                .constraint()
                .enabled_groups()
                .first()
                .map_or_else(|| "*".to_string(), |g| g.range().to_string());

            let (version, hashes) = if lock {
                dep.chosen_release().map_or_else(
                    || (declared_range.clone(), Vec::new()),
                    |r| (r.version().to_string(), r.hashes().to_vec()),
                )
            } else {
                (declared_range, Vec::new())
            };

            let (link, is_editable) = dep.link().map_or((None, false), |decl| {
                let editable = matches!(decl, crate::declaration::Declaration::LocalPath { editable: true, .. });
                (decl.link_string(), editable)
            });

            out.push(Self {
                name: dep.name().to_string(),
                canonical_name: dep.canonical_name().to_string(),
                version,
                extras: dep.extras().to_vec(),
                marker: dep.marker().map(ToString::to_string),
                link,
                hashes,
                is_editable,
                is_dev: false,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, RootDependency};
    use crate::release::{Origin, Release};
    use crate::repository::Repository;
    use std::sync::Arc;
    use vellum_core::error::RepoError;
    use vellum_core::Version;

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
    fn lock_emits_pinned_version_and_hashes() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        let mut dep = Dependency::new("foo", repo);
        let available = vec![Version::parse("1.0").unwrap()];
        dep.constraint_mut().attach("root", ">=1.0", &available).unwrap();
        let release = Release::new(
            "foo",
            Version::parse("1.0").unwrap(),
            vec![],
            vec![],
            vec!["sha256:abc".to_string()],
            Origin::Index { url: "x".to_string() },
        );
        dep.choose(release);
        dep.set_applied(true);
        graph.add(dep, 0, vec![]);

        let reqs = Requirement::from_graph(&graph, true);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].version, "1.0");
        assert_eq!(reqs[0].hashes, vec!["sha256:abc".to_string()]);
    }

    #[test]
    fn manifest_mode_emits_declared_range() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        let mut dep = Dependency::new("foo", repo);
        let available = vec![Version::parse("1.0").unwrap()];
        dep.constraint_mut().attach("root", ">=1.0", &available).unwrap();
        graph.add(dep, 0, vec![]);

        let reqs = Requirement::from_graph(&graph, false);
        assert_eq!(reqs[0].version, ">=1.0");
        assert!(reqs[0].hashes.is_empty());
    }

    #[test]
    fn results_are_sorted_by_canonical_name() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        for name in ["Zeta", "alpha", "Mid_dle"] {
            let mut dep = Dependency::new(name, repo.clone());
            let available = vec![Version::parse("1.0").unwrap()];
            dep.constraint_mut().attach("root", ">=1.0", &available).unwrap();
            graph.add(dep, 0, vec![]);
        }
        let reqs = Requirement::from_graph(&graph, false);
        let names: Vec<&str> = reqs.iter().map(|r| r.canonical_name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
