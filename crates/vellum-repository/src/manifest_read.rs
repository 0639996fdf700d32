//! Shared logic for turning a loaded [`RootDependency`]'s declared
//! dependencies into constraint-attached [`Dependency`] nodes, used by both
//! [`crate::local::LocalPathRepository`] and [`crate::vcs_repo::VcsRepository`]
//! — both variants resolve by reading a manifest off disk rather than
//! querying an index.

use std::path::Path;
use std::sync::Arc;
use vellum_converters::manifest::ManifestConverter;
use vellum_converters::setup_py::SetupPyConverter;
use vellum_converters::Converter;
use vellum_core::error::RepoError;
use vellum_core::Version;
use vellum_resolver::dependency::{Dependency, RootDependency};
use vellum_resolver::Repository;

/// Read whichever manifest form exists at `dir`: `pyproject.toml` first,
/// `setup.py` as the legacy fallback, applied to a checkout instead of a
/// converter invocation.
///
/// # Errors
/// [`RepoError::LocalPath`] if neither file is present or readable.
pub fn read_project_manifest(dir: &Path) -> Result<RootDependency, RepoError> {
    let pyproject = dir.join("pyproject.toml");
    if let Ok(text) = std::fs::read_to_string(&pyproject) {
        if let Ok(root) = ManifestConverter::new().loads(&text) {
            return Ok(root);
        }
    }

    let setup_py = dir.join("setup.py");
    if let Ok(text) = std::fs::read_to_string(&setup_py) {
        if let Ok(root) = SetupPyConverter::new().loads(&text) {
            return Ok(root);
        }
    }

    Err(RepoError::LocalPath { path: dir.to_path_buf() })
}

/// Wire a loaded project's declared dependencies into `Dependency` nodes
/// pointed at `sub_repo`, with each one's constraint already attached
/// against `name`. `available` for each sub-dependency is left empty here —
/// the resolver recomputes it once the sub-dependency is actually listed in
/// the graph (the mutator's candidate-ordering step), so an empty seed here
/// never under- or over-constrains anything.
pub fn wire_declared(project: &RootDependency, requester: &str, sub_repo: &Arc<dyn Repository>) -> Vec<Dependency> {
    project
        .declared
        .iter()
        .map(|d| {
            let range_text = match &d.declaration {
                vellum_resolver::declaration::Declaration::Version(v) => v.clone(),
                _ => "*".to_string(),
            };
            let mut dep = Dependency::new(&d.name, sub_repo.clone());
            dep.set_extras(d.extras.clone());
            if let Some(m) = &d.marker {
                dep.set_marker(vellum_core::marker::Marker::parse(m).ok());
            }
            let _ = dep.constraint_mut().attach(requester, &range_text, &[]);
            dep
        })
        .collect()
}

/// The synthetic version a filesystem-backed release carries: the
/// manifest's own declared version if present, else `0` (always satisfies
/// an unbounded range — non-index sources only ever offer one candidate
/// release).
#[must_use]
pub fn synthetic_version(project: &RootDependency) -> Version {
    project
        .version
        .as_deref()
        .and_then(|v| Version::parse(v).ok())
        .unwrap_or_else(|| Version::parse("0").expect("'0' is always a valid version"))
}
