//! Index repository: an HTTP JSON endpoint listing every release of a
//! package and its declared requirements, the index-backed half of the
//! `Repository` variants this crate provides. Responses are cached through
//! [`vellum_cache::HttpCache`] so re-fetching a name already seen this
//! resolve is free.
//!
//! The wire shape is a flat JSON document:
//!
//! ```json
//! {
//!   "releases": [
//!     {"version": "2.31.0", "hashes": ["sha256:..."], "requires": ["urllib3>=1.21.1,<3"]}
//!   ]
//! }
//! ```
//!
//! Each returned [`Release`] carries its sub-dependencies already wired and
//! constraint-attached, since [`vellum_resolver::resolver::Resolver`] reads
//! `release.dependencies()` directly rather than calling
//! [`Repository::get_dependencies`] itself; this repository populates both
//! from the same fetch.

use crate::error::bad_document;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use vellum_cache::{CacheKey, HttpCache};
use vellum_core::error::RepoError;
use vellum_core::Version;
use vellum_resolver::dependency::Dependency;
use vellum_resolver::release::{Origin, Release};
use vellum_resolver::Repository;

#[derive(Debug, Deserialize)]
struct IndexDocument {
    #[serde(default)]
    releases: Vec<IndexRelease>,
}

#[derive(Debug, Deserialize)]
struct IndexRelease {
    version: String,
    #[serde(default)]
    hashes: Vec<String>,
    #[serde(default)]
    requires: Vec<String>,
}

/// A transport-level failure, kept `Clone` so it can flow through
/// [`HttpCache::get_or_fetch`]'s shared-future error bound before being
/// converted to a [`RepoError`] at the boundary this repository exposes.
#[derive(Debug, Clone)]
struct FetchFailure(String);

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single package index reachable over HTTP, identified by its base URL
/// (e.g. `https://index.example.test/simple/`).
#[derive(Debug)]
pub struct IndexRepository {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<HttpCache>,
    /// Set once via [`IndexRepository::install_self`] right after this
    /// repository is wrapped in an `Arc`, so sub-dependencies wire back to
    /// the same index without every caller threading an
    /// `Arc<dyn Repository>` through by hand.
    self_ref: OnceCell<Arc<dyn Repository>>,
}

impl IndexRepository {
    #[must_use]
    pub fn new(base_url: impl Into<String>, cache: Arc<HttpCache>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            cache,
            self_ref: OnceCell::new(),
        }
    }

    /// Wire this repository's own `Arc` handle back into itself. A no-op
    /// if called more than once.
    pub fn install_self(arc: &Arc<Self>) {
        let handle: Arc<dyn Repository> = arc.clone();
        let _ = arc.self_ref.set(handle);
    }

    fn package_url(&self, name: &str) -> String {
        let canonical = vellum_core::canonicalize(name);
        format!("{}/{canonical}.json", self.base_url.trim_end_matches('/'))
    }

    fn fetch(&self, name: &str) -> Result<IndexDocument, RepoError> {
        let url = self.package_url(name);
        let key = CacheKey::new(&url, None);
        debug!(url = %url, "fetching index document");

        let entry = futures::executor::block_on(self.cache.get_or_fetch(key, || async {
            let resp = self.client.get(&url).send().await.map_err(|e| FetchFailure(e.to_string()))?;
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchFailure(format!("package not found: {name}")));
            }
            let resp = resp.error_for_status().map_err(|e| FetchFailure(e.to_string()))?;
            let bytes: Bytes = resp.bytes().await.map_err(|e| FetchFailure(e.to_string()))?;
            Ok(bytes)
        }))
        .map_err(|e: FetchFailure| RepoError::Network { url: url.clone(), message: e.0 })?;

        vellum_core::from_json_slice(&entry.body).map_err(|e| bad_document(name, e.to_string()))
    }

    /// Just the versions known for `name`, without recursing into their own
    /// requirements — used to compute the `available` list a sub-dependency's
    /// constraint is attached against, without unbounded recursion through a
    /// requirement cycle.
    fn bare_versions(&self, name: &str) -> Vec<Version> {
        self.fetch(name)
            .map(|doc| doc.releases.iter().filter_map(|r| Version::parse(&r.version).ok()).collect())
            .unwrap_or_default()
    }

    /// Parse `name`'s `requires` entries into constraint-attached
    /// [`Dependency`] nodes pointed back at this same index.
    fn resolve_requirements(&self, requester: &str, requires: &[String]) -> Result<Vec<Dependency>, RepoError> {
        let Some(self_repo) = self.self_ref.get() else {
            return Err(bad_document(requester, "IndexRepository::install_self was never called"));
        };

        let mut deps = Vec::with_capacity(requires.len());
        for raw in requires {
            deps.push(self.parse_requirement(requester, raw, self_repo.clone())?);
        }
        Ok(deps)
    }

    fn parse_requirement(&self, requester: &str, raw: &str, repo: Arc<dyn Repository>) -> Result<Dependency, RepoError> {
        let raw = raw.trim();
        let (body, marker) = raw.split_once(';').map_or((raw, None), |(b, m)| (b, Some(m.trim().to_string())));
        let split_at = body.find(|c: char| "([=<>!~".contains(c)).unwrap_or(body.len());
        let (name_part, range_part) = body.split_at(split_at);

        let (name, extras) = if let Some(open) = name_part.find('[') {
            let close = name_part[open..].find(']').unwrap_or(name_part.len() - open);
            let extras = name_part[open + 1..open + close]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            (name_part[..open].trim(), extras)
        } else {
            (name_part.trim(), Vec::new())
        };

        if name.is_empty() {
            return Err(bad_document(requester, format!("could not parse requirement '{raw}'")));
        }

        let range = range_part.trim().trim_start_matches('(').trim_end_matches(')').trim();
        let range = if range.is_empty() { "*" } else { range };

        let available = self.bare_versions(name);
        let mut dep = Dependency::new(name, repo);
        dep.set_extras(extras);
        if let Some(m) = marker {
            dep.set_marker(vellum_core::marker::Marker::parse(&m).ok());
        }
        let _ = dep.constraint_mut().attach(requester, range, &available);
        Ok(dep)
    }
}

impl Repository for IndexRepository {
    fn list_releases(&self, name: &str) -> Result<Vec<Release>, RepoError> {
        let doc = self.fetch(name)?;
        let mut releases = Vec::with_capacity(doc.releases.len());
        for entry in &doc.releases {
            let version = Version::parse(&entry.version).map_err(|e| bad_document(name, e.to_string()))?;
            let dependencies = self.resolve_requirements(name, &entry.requires)?;
            releases.push(Release::new(
                name,
                version,
                dependencies,
                Vec::new(),
                entry.hashes.clone(),
                Origin::Index { url: self.base_url.clone() },
            ));
        }
        releases.sort_by(|a, b| b.version().cmp(a.version()));
        Ok(releases)
    }

    fn get_dependencies(&self, release: &Release) -> Result<Vec<Dependency>, RepoError> {
        Ok(release.dependencies().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_url_canonicalizes_name() {
        let repo = IndexRepository::new("https://index.example.test", Arc::new(HttpCache::new(100)));
        assert_eq!(repo.package_url("My_Package.Name"), "https://index.example.test/my-package-name.json");
    }
}
