//! The TOML-based lockfile format: an array of `[[package]]` tables, each
//! pinning an exact version plus content hashes and the source it was
//! resolved from. `lock()` is `true` — every requirement round-trips with
//! an exact version, never a range.

use crate::error::{ConverterError, Result};
use crate::Converter;
use serde::{Deserialize, Serialize};
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::{DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "lockfile";

#[derive(Debug, Default)]
pub struct LockfileConverter;

impl LockfileConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LockDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    package: Vec<LockedPackage>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extras: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    editable: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    dev: bool,
}

impl Converter for LockfileConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        true
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let doc: LockDocument = toml::from_str(text).map_err(|e| ConverterError::Toml(e.to_string()))?;
        let mut root = RootDependency::new("locked-project");
        root.declared = doc
            .package
            .into_iter()
            .map(|p| {
                let declaration = match &p.source {
                    Some(link) => parse_link(link).unwrap_or(Declaration::Version(p.version.clone())),
                    None => Declaration::Version(p.version),
                };
                DeclaredDependency {
                    name: p.name,
                    declaration,
                    extras: p.extras,
                    marker: p.marker,
                    dev: p.dev,
                }
            })
            .collect();
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        let package = requirements
            .iter()
            .map(|r| LockedPackage {
                name: r.name.clone(),
                version: r.version.clone(),
                extras: r.extras.clone(),
                marker: r.marker.clone(),
                source: r.link.clone(),
                hashes: r.hashes.clone(),
                editable: r.is_editable,
                dev: r.is_dev,
            })
            .collect();
        let doc = LockDocument { version: 1, package };
        toml::to_string_pretty(&doc).map_err(|e| ConverterError::TomlSer(e.to_string()))
    }
}

/// Recover a [`Declaration`] from a `vcs+url@ref` / `file+path` link string
/// (the inverse of `Declaration::link_string`).
fn parse_link(link: &str) -> Option<Declaration> {
    for kind_str in ["git", "hg", "svn", "bzr"] {
        if let Some(rest) = link.strip_prefix(&format!("{kind_str}+")) {
            let (url, reference) = rest.split_once('@')?;
            return Some(Declaration::Vcs {
                kind: vellum_resolver::declaration::VcsKind::parse(kind_str)?,
                url: url.to_string(),
                reference: reference.to_string(),
                subdirectory: None,
            });
        }
    }
    link.strip_prefix("file+").map(|path| Declaration::LocalPath { path: path.to_string(), editable: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_pinned_version_and_hashes() {
        let conv = LockfileConverter::new();
        let reqs = vec![Requirement {
            name: "foo".to_string(),
            canonical_name: "foo".to_string(),
            version: "1.2.3".to_string(),
            extras: vec![],
            marker: None,
            link: None,
            hashes: vec!["sha256:abc".to_string()],
            is_editable: false,
            is_dev: false,
        }];
        let text = conv.dumps(&reqs, &RootDependency::new("x"), None).unwrap();
        let root = conv.loads(&text).unwrap();
        assert_eq!(root.declared.len(), 1);
        assert_eq!(root.declared[0].declaration, Declaration::Version("1.2.3".to_string()));
    }

    #[test]
    fn vcs_source_round_trips_through_link() {
        let conv = LockfileConverter::new();
        let reqs = vec![Requirement {
            name: "foo".to_string(),
            canonical_name: "foo".to_string(),
            version: "0".to_string(),
            extras: vec![],
            marker: None,
            link: Some("git+https://x/y@abc".to_string()),
            hashes: vec![],
            is_editable: false,
            is_dev: false,
        }];
        let text = conv.dumps(&reqs, &RootDependency::new("x"), None).unwrap();
        let root = conv.loads(&text).unwrap();
        match &root.declared[0].declaration {
            Declaration::Vcs { url, reference, .. } => {
                assert_eq!(url, "https://x/y");
                assert_eq!(reference, "abc");
            }
            other => panic!("expected Vcs, got {other:?}"),
        }
    }

    #[test]
    fn dumps_sorted_requirements_deterministically_across_two_runs() {
        let conv = LockfileConverter::new();
        let reqs = vec![
            Requirement {
                name: "click".to_string(),
                canonical_name: "click".to_string(),
                version: "8.1.3".to_string(),
                extras: vec![],
                marker: None,
                link: None,
                hashes: vec!["sha256:abc123".to_string()],
                is_editable: false,
                is_dev: false,
            },
            Requirement {
                name: "requests".to_string(),
                canonical_name: "requests".to_string(),
                version: "2.28.2".to_string(),
                extras: vec!["socks".to_string()],
                marker: Some("python_version >= \"3.8\"".to_string()),
                link: None,
                hashes: vec!["sha256:def456".to_string(), "sha256:fedcba".to_string()],
                is_editable: false,
                is_dev: true,
            },
        ];
        let once = conv.dumps(&reqs, &RootDependency::new("x"), None).unwrap();
        let twice = conv.dumps(&reqs, &RootDependency::new("x"), None).unwrap();
        assert_eq!(once, twice, "dumps() must be byte-identical across runs (spec.md §8 #7)");
        assert!(once.contains("name = \"click\""));
        assert!(once.contains("name = \"requests\""));
    }
}
