//! Graph nodes: `Dependency` (one named requirement, possibly with parents)
//! and `RootDependency` (the project itself, the sole parentless node).

use crate::constraint::Constraint;
use crate::declaration::Declaration;
use crate::release::Release;
use crate::repository::Repository;
use std::sync::Arc;
use vellum_core::canonical_name::canonicalize;
use vellum_core::marker::Marker;

/// A named node in the dependency graph: a canonical name, the
/// [`Constraint`] every parent has imposed on it, the [`Repository`] it is
/// resolved against, and the bookkeeping the resolver mutates as it
/// searches (chosen release, applied flag).
#[derive(Debug, Clone)]
pub struct Dependency {
    name: String,
    canonical_name: String,
    constraint: Constraint,
    repository: Arc<dyn Repository>,
    extras: Vec<String>,
    marker: Option<Marker>,
    link: Option<Declaration>,
    chosen_release: Option<Release>,
    applied: bool,
}

impl Dependency {
    #[must_use]
    pub fn new(name: impl Into<String>, repository: Arc<dyn Repository>) -> Self {
        let name = name.into();
        let canonical_name = canonicalize(&name);
        Self {
            name,
            canonical_name,
            constraint: Constraint::new(),
            repository,
            extras: Vec::new(),
            marker: None,
            link: None,
            chosen_release: None,
            applied: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    #[must_use]
    pub const fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn constraint_mut(&mut self) -> &mut Constraint {
        &mut self.constraint
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    #[must_use]
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn set_extras(&mut self, extras: Vec<String>) {
        self.extras = extras;
    }

    #[must_use]
    pub const fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn set_marker(&mut self, marker: Option<Marker>) {
        self.marker = marker;
    }

    #[must_use]
    pub const fn link(&self) -> Option<&Declaration> {
        self.link.as_ref()
    }

    pub fn set_link(&mut self, link: Option<Declaration>) {
        self.link = link;
    }

    #[must_use]
    pub const fn chosen_release(&self) -> Option<&Release> {
        self.chosen_release.as_ref()
    }

    pub fn choose(&mut self, release: Release) {
        self.chosen_release = Some(release);
    }

    pub fn unchoose(&mut self) {
        self.chosen_release = None;
    }

    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn set_applied(&mut self, applied: bool) {
        self.applied = applied;
    }

    /// `true` if this dependency should be skipped entirely: its marker
    /// evaluates to `false` against `env`.
    #[must_use]
    pub fn is_excluded_by_marker(&self, env: &vellum_core::Environment) -> bool {
        self.marker.as_ref().is_some_and(|m| !m.evaluate(env))
    }
}

/// Project metadata author: name plus an optional contact email, attached
/// to a project's own metadata alongside its description and license.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

/// The project itself: the sole parentless [`Dependency`]-like node,
/// carrying project metadata instead of a name/constraint pair.
#[derive(Debug, Clone, Default)]
pub struct RootDependency {
    pub name: String,
    pub version: Option<String>,
    pub authors: Vec<Author>,
    pub description: Option<String>,
    /// The ecosystem-version constraint text (e.g. `python_requires`).
    pub runtime_requires: Option<String>,
    pub entry_points: std::collections::BTreeMap<String, String>,
    pub readme: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
    /// Raw declared dependencies, as parsed by a converter's `loads`,
    /// before the resolver attaches them to the Graph.
    pub declared: Vec<DeclaredDependency>,
}

/// One entry out of a manifest's dependency table, still in "declared" form
/// (not yet a Graph node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub name: String,
    pub declaration: Declaration,
    pub extras: Vec<String>,
    pub marker: Option<String>,
    pub dev: bool,
}

impl RootDependency {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
