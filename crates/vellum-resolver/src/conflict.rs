//! Turns an empty-intersection [`crate::constraint::Constraint`] into a
//! human-readable report.

use crate::graph::Graph;

/// Stateless formatter for conflict reports; takes the [`Graph`] and the
/// canonical name of the conflicting node.
pub struct ConflictAnalyzer;

impl ConflictAnalyzer {
    /// Build a report naming the package, every requester, the specifier
    /// text each one demanded, and the candidate set each one admits —
    /// highlighting that their intersection is empty.
    #[must_use]
    pub fn analyze(graph: &Graph, name: &str) -> String {
        let Some(node) = graph.get_by_name(name) else {
            return format!("no such package: {name}");
        };

        let mut report = format!(
            "could not find a version of '{}' that satisfies every requirement:\n",
            node.dependency.name()
        );

        for group in node.dependency.constraint().enabled_groups() {
            let candidates: Vec<String> = group.candidates().iter().map(ToString::to_string).collect();
            let candidate_list = if candidates.is_empty() {
                "(none)".to_string()
            } else {
                candidates.join(", ")
            };
            report.push_str(&format!(
                "  - {} requires {} ({})\n",
                group.requester(),
                group.range(),
                candidate_list
            ));
        }

        report.push_str("these requirements have no version in common.");
        report
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
    fn report_names_every_requester() {
        let mut graph = Graph::new(RootDependency::new("root"));
        let repo: Arc<dyn Repository> = Arc::new(EmptyRepo);
        let mut dep = Dependency::new("foo", repo);
        let available = vec![Version::parse("1.0").unwrap(), Version::parse("2.0").unwrap()];
        dep.constraint_mut().attach("alpha", "<1.5", &available).unwrap();
        dep.constraint_mut().attach("beta", ">=1.5", &available).unwrap();
        graph.add(dep, 1, available.iter().map(|v| Release::new("foo", v.clone(), vec![], vec![], vec![], Origin::Index { url: "x".to_string() })).collect());

        let report = ConflictAnalyzer::analyze(&graph, "foo");
        assert!(report.contains("alpha"));
        assert!(report.contains("beta"));
        assert!(report.contains("no version in common"));
    }
}
