//! The in-flight adjacency of activated Dependencies, keyed by canonical
//! name, each carrying the backtracking level at which it was applied.

use crate::dependency::{Dependency, RootDependency};
use crate::release::Release;
use vellum_core::{canonical_name::canonicalize, Version};

/// One node in the [`Graph`]: a [`Dependency`] plus the cached release list
/// its repository returned (fetched once; a repository is expected to
/// return the same list for the same name within one resolve) and the
/// level at which it was applied.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub dependency: Dependency,
    pub level: usize,
    pub releases: Vec<Release>,
}

impl GraphNode {
    #[must_use]
    pub fn available_versions(&self) -> Vec<Version> {
        self.releases.iter().map(|r| r.version().clone()).collect()
    }
}

/// A DAG of Dependency nodes keyed by canonical name. Invariant: at most one
/// node per canonical name; the root is conceptually at level 0 (it is not
/// itself stored as a node — `metainfo` proxies to it directly).
#[derive(Debug, Clone)]
pub struct Graph {
    root: RootDependency,
    nodes: vellum_core::AHashMap<String, GraphNode>,
}

impl Graph {
    #[must_use]
    pub fn new(root: RootDependency) -> Self {
        Self {
            root,
            nodes: vellum_core::AHashMap::default(),
        }
    }

    #[must_use]
    pub const fn metainfo(&self) -> &RootDependency {
        &self.root
    }

    pub fn metainfo_mut(&mut self) -> &mut RootDependency {
        &mut self.root
    }

    /// Insert or replace the node for `dependency`'s canonical name.
    pub fn add(&mut self, dependency: Dependency, level: usize, releases: Vec<Release>) {
        let key = dependency.canonical_name().to_string();
        self.nodes.insert(
            key,
            GraphNode {
                dependency,
                level,
                releases,
            },
        );
    }

    /// Remove the node for `canonical_name`, returning it if present.
    pub fn remove(&mut self, canonical_name: &str) -> Option<GraphNode> {
        self.nodes.remove(canonical_name)
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(&canonicalize(name))
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&canonicalize(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(&canonicalize(name))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The conflicting Dependency with the lexicographically smallest
    /// canonical name, if any. Picking a fixed tie-break instead of "first
    /// found" keeps the resolver's traversal deterministic regardless of the
    /// node map's (hash-seeded) iteration order.
    #[must_use]
    pub fn conflict(&self) -> Option<&GraphNode> {
        self.nodes
            .values()
            .filter(|node| {
                node.dependency
                    .constraint()
                    .is_conflicted(&node.available_versions())
            })
            .min_by_key(|node| node.dependency.canonical_name())
    }

    /// Every Dependency, applied and carrying a chosen release.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.nodes
            .values()
            .all(|n| n.dependency.is_applied() && n.dependency.chosen_release().is_some())
    }

    /// Remove every node whose Constraint no longer has any requesters —
    /// called after unapplying a parent during backtracking.
    pub fn prune_unreferenced(&mut self) {
        self.nodes.retain(|_, node| !node.dependency.constraint().is_empty());
    }
}
