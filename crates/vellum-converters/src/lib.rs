//! The converter contract: every supported manifest format implements
//! [`Converter`], parsing text into a [`RootDependency`] and serializing a
//! resolved set of [`Requirement`]s back out. [`convert`] implements the
//! load → (maybe resolve) → dump control flow a caller drives across a
//! `from`/`to` pair.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod installed;
pub mod lockfile;
pub mod manifest;
pub mod metadata;
pub mod pipfile;
pub mod requirements_pair;
pub mod requirements_txt;
pub mod setup_py;

pub use error::{ConverterError, Result};

use std::path::Path;
use vellum_core::marker::Environment;
use vellum_resolver::{CancellationToken, Dependency, Graph, Repository, Requirement, Resolver, RootDependency};

/// A manifest (range-based) or lock (pin-based) format. `loads`/`dumps`
/// operate on in-memory text; `load`/`dump` on a path; `lock()` reports
/// which kind this format is.
pub trait Converter {
    /// Stable name used in error messages and the `from`/`to` CLI surface.
    fn format_name(&self) -> &'static str;

    /// `true` if this format pins exact versions plus hashes ("lockfile");
    /// `false` if it stores ranges ("manifest").
    fn lock(&self) -> bool;

    /// Parse `text` into an unresolved graph root: declared dependencies
    /// with their ranges, extras, markers, and link information attached,
    /// but not yet resolved against any repository.
    ///
    /// # Errors
    /// [`ConverterError::Parse`] if `text` doesn't match this format's
    /// grammar.
    fn loads(&self, text: &str) -> Result<RootDependency>;

    /// Serialize `requirements` back to text. When `prior_text` is `Some`
    /// and the format is whitespace/comment preserving, unknown keys and
    /// ordering from the prior text are merged in rather than discarded.
    ///
    /// # Errors
    /// [`ConverterError::Unrepresentable`] if a requirement carries
    /// information this format has no way to express; [`ConverterError::ReadOnly`]
    /// for inspector-only formats.
    fn dumps(
        &self,
        requirements: &[Requirement],
        project: &RootDependency,
        prior_text: Option<&str>,
    ) -> Result<String>;

    /// [`Converter::loads`] against a path.
    ///
    /// # Errors
    /// [`ConverterError::Io`] if the path cannot be read, or whatever
    /// [`Converter::loads`] returns for its content.
    fn load(&self, path: &Path) -> Result<RootDependency> {
        let text = std::fs::read_to_string(path).map_err(|e| ConverterError::io(path, e))?;
        self.loads(&text)
    }

    /// [`Converter::dumps`] against a path, merging the file's existing
    /// content as `prior_text` when it already exists.
    ///
    /// # Errors
    /// [`ConverterError::Io`] at write time, or whatever [`Converter::dumps`]
    /// returns.
    fn dump(&self, path: &Path, requirements: &[Requirement], project: &RootDependency) -> Result<()> {
        let prior = std::fs::read_to_string(path).ok();
        let text = self.dumps(requirements, project, prior.as_deref())?;
        std::fs::write(path, text).map_err(|e| ConverterError::io(path, e))
    }
}

/// A source of candidate releases for every name a loaded manifest might
/// declare, handed to [`convert`] so it can build a [`Graph`] and invoke the
/// [`Resolver`] when the lock boundary requires it.
pub trait RepositoryContext {
    fn repository_for(&self, declared_name: &str) -> std::sync::Arc<dyn Repository>;
}

/// The lock-boundary control flow: load `from`, resolve only if `from` is a
/// manifest and `to` is a lock, then dump to `to`.
///
/// - manifest → lock: the [`Resolver`] is invoked.
/// - lock → lock: direct transcription (every requirement already carries
///   an exact pinned version).
/// - manifest → manifest, lock → manifest: direct transcription; the caller
///   is responsible for merging transitive requirements if it wants them.
///
/// # Errors
/// Whatever `from.loads`, the resolver, or `to.dumps` return. A conflict
/// during resolution is returned as-is so the caller's conflict analyzer
/// output reaches the user unmodified.
pub fn convert(
    from: &dyn Converter,
    from_text: &str,
    to: &dyn Converter,
    repos: &dyn RepositoryContext,
    env: &Environment,
    silent: bool,
) -> std::result::Result<String, ConvertError> {
    let project = from.loads(from_text).map_err(ConvertError::Load)?;

    let requirements = if !from.lock() && to.lock() {
        let mut graph = build_graph(&project, repos, env);
        let mut resolver = Resolver::new(env.clone(), silent, CancellationToken::new());
        resolver.resolve(&mut graph).map_err(ConvertError::Resolve)?;
        Requirement::from_graph(&graph, true)
    } else {
        direct_requirements(&project, from.lock())
    };

    to.dumps(&requirements, &project, None).map_err(ConvertError::Dump)
}

/// Build a [`Graph`] from a project's declared dependencies, wiring each one
/// to a repository and attaching the root's own groups, without running the
/// resolver.
///
/// A name declared twice at the root (spec.md §9's Open Question) attaches a
/// second group under the same `project.name` requester onto the
/// already-present node rather than replacing it, so the ranges intersect
/// instead of the second declaration silently clobbering the first; an
/// empty intersection then surfaces as a conflict the same way any other
/// empty-range `Constraint` does.
///
/// A declaration whose marker evaluates false against `env` is pruned before
/// it ever reaches the graph (spec.md §9: "the resolver prunes dependencies
/// whose marker evaluates false before applying their constraints"), the
/// same rule `resolver.rs::apply_candidate` applies to transitive
/// sub-dependencies it discovers.
fn build_graph(project: &RootDependency, repos: &dyn RepositoryContext, env: &Environment) -> Graph {
    let mut graph = Graph::new(project.clone());
    for declared in &project.declared {
        if declared
            .marker
            .as_ref()
            .and_then(|m| vellum_core::marker::Marker::parse(m).ok())
            .is_some_and(|m| !m.evaluate(env))
        {
            continue;
        }
        let repo = repos.repository_for(&declared.name);
        let range_text = match &declared.declaration {
            vellum_resolver::declaration::Declaration::Version(v) => v.clone(),
            _ => "*".to_string(),
        };
        let releases = repo.list_releases(&declared.name).unwrap_or_default();
        let available: Vec<_> = releases.iter().map(|r| r.version().clone()).collect();

        if graph.contains(&declared.name) {
            let node = graph
                .get_by_name_mut(&declared.name)
                .expect("contains() just confirmed presence");
            let _ = node.dependency.constraint_mut().attach(&project.name, &range_text, &available);
            if declared.marker.is_some() || !declared.extras.is_empty() {
                // A second declaration's extras/marker narrow the merged
                // node; extras accumulate, the marker of the most recent
                // declaration wins (no ordering is specified for conflicting
                // markers on duplicate declarations).
                let mut extras = node.dependency.extras().to_vec();
                for e in &declared.extras {
                    if !extras.contains(e) {
                        extras.push(e.clone());
                    }
                }
                node.dependency.set_extras(extras);
                if let Some(m) = &declared.marker {
                    node.dependency.set_marker(vellum_core::marker::Marker::parse(m).ok());
                }
            }
            continue;
        }

        let mut dep = Dependency::new(&declared.name, repo);
        dep.set_extras(declared.extras.clone());
        if let Some(m) = &declared.marker {
            dep.set_marker(vellum_core::marker::Marker::parse(m).ok());
        }
        if !matches!(declared.declaration, vellum_resolver::declaration::Declaration::Version(_)) {
            dep.set_link(Some(declared.declaration.clone()));
        }
        let _ = dep.constraint_mut().attach(&project.name, &range_text, &available);
        graph.add(dep, 1, releases);
    }
    graph
}

/// Project a loaded [`RootDependency`]'s own declared dependencies straight
/// into [`Requirement`]s, without touching a [`Repository`] or the resolver
/// — used for manifest→manifest, lock→lock, and lock→manifest transcription,
/// which never invokes the resolver. When `source_is_lock`, a bare version
/// (no operator prefix) is a pin and is rendered `==<version>`.
fn direct_requirements(project: &RootDependency, source_is_lock: bool) -> Vec<Requirement> {
    let mut names: Vec<&vellum_resolver::dependency::DeclaredDependency> = project.declared.iter().collect();
    names.sort_by_key(|d| vellum_core::canonicalize(&d.name));

    names
        .into_iter()
        .map(|d| {
            let (version, link) = match &d.declaration {
                vellum_resolver::declaration::Declaration::Version(v) => {
                    let v = if source_is_lock && !v.starts_with("==") {
                        format!("=={v}")
                    } else {
                        v.clone()
                    };
                    (v, None)
                }
                other => ("*".to_string(), other.link_string()),
            };
            Requirement {
                name: d.name.clone(),
                canonical_name: vellum_core::canonicalize(&d.name),
                version,
                extras: d.extras.clone(),
                marker: d.marker.clone(),
                link,
                hashes: Vec::new(),
                is_editable: matches!(
                    &d.declaration,
                    vellum_resolver::declaration::Declaration::LocalPath { editable: true, .. }
                ),
                is_dev: d.dev,
            }
        })
        .collect()
}

/// Errors from the [`convert`] orchestration, distinguishing which stage
/// failed so a CLI can map each to the right exit code.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("loading source manifest: {0}")]
    Load(ConverterError),
    #[error(transparent)]
    Resolve(#[from] vellum_core::error::Error),
    #[error("writing target manifest: {0}")]
    Dump(ConverterError),
}
