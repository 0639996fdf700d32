//! The two-table TOML Pipfile format and its companion JSON lock
//! (`Pipfile.lock`).
//!
//! `Pipfile` carries `[[source]]`, `[packages]`, `[dev-packages]`; a package
//! value is either a bare version string or an inline table carrying
//! `version`, `extras`, `markers`, `ref`, `vcs`, `index`, `editable`, `path`,
//! `file`, `uri`, `git`/`svn`/`hg`/`bzr`, `subdirectory`, `hashes`. Link
//! strings are assembled `vcs+url@ref`, matching `Declaration::link_string`.

use crate::error::{ConverterError, Result};
use crate::Converter;
use std::collections::BTreeMap;
use toml_edit::{value, Array, DocumentMut, Item, Table, Value};
use vellum_resolver::declaration::{Declaration, VcsKind};
use vellum_resolver::dependency::{DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "Pipfile";
const FORMAT_LOCK: &str = "Pipfile.lock";

#[derive(Debug, Default)]
pub struct PipfileConverter;

impl PipfileConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parse_table(name: &str, entry: &Item, dev: bool, out: &mut Vec<DeclaredDependency>) -> Result<()> {
        if let Some(version) = entry.as_str() {
            out.push(DeclaredDependency {
                name: name.to_string(),
                declaration: Declaration::Version(if version == "*" { "*".to_string() } else { version.to_string() }),
                extras: Vec::new(),
                marker: None,
                dev,
            });
            return Ok(());
        }

        let Some(table) = entry.as_inline_table().map(|t| t as &dyn TomlLike).or_else(|| entry.as_table().map(|t| t as &dyn TomlLike)) else {
            return Err(ConverterError::parse(FORMAT, format!("package '{name}' has neither a string nor a table value")));
        };

        let get = |key: &str| table.get_str(key);
        let version = get("version").unwrap_or("*").to_string();
        let extras = table
            .get_array("extras")
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(ToString::to_string)).collect())
            .unwrap_or_default();
        let marker = get("markers").map(ToString::to_string);
        let editable = table.get_bool("editable").unwrap_or(false);

        let vcs_url = ["git", "hg", "svn", "bzr"].iter().find_map(|k| get(k).map(|u| (*k, u)));
        let declaration = if let Some((kind, url)) = vcs_url {
            let reference = get("ref").unwrap_or("HEAD").to_string();
            Declaration::Vcs {
                kind: VcsKind::parse(kind).expect("known vcs key"),
                url: url.to_string(),
                reference,
                subdirectory: get("subdirectory").map(ToString::to_string),
            }
        } else if let Some(path) = get("path") {
            Declaration::LocalPath { path: path.to_string(), editable }
        } else if let Some(file) = get("file").or_else(|| get("uri")) {
            Declaration::Archive { url: file.to_string(), hashes: Vec::new() }
        } else {
            Declaration::Version(version)
        };

        out.push(DeclaredDependency {
            name: name.to_string(),
            declaration,
            extras,
            marker,
            dev,
        });
        Ok(())
    }
}

/// Small seam so inline tables and full tables can be read uniformly;
/// Pipfile allows either spelling for a package entry.
trait TomlLike {
    fn get_str(&self, key: &str) -> Option<&str>;
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_array(&self, key: &str) -> Option<&Array>;
}

impl TomlLike for toml_edit::InlineTable {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
    fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key).and_then(Value::as_array)
    }
}

impl TomlLike for Table {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Item::as_str)
    }
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Item::as_bool)
    }
    fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key).and_then(Item::as_array)
    }
}

impl Converter for PipfileConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let doc = text.parse::<DocumentMut>().map_err(|e| ConverterError::Toml(e.to_string()))?;
        let mut root = RootDependency::new("pipfile-project");

        let mut declared = Vec::new();
        if let Some(packages) = doc.get("packages").and_then(Item::as_table) {
            for (name, entry) in packages.iter() {
                Self::parse_table(name, entry, false, &mut declared)?;
            }
        }
        if let Some(packages) = doc.get("dev-packages").and_then(Item::as_table) {
            for (name, entry) in packages.iter() {
                Self::parse_table(name, entry, true, &mut declared)?;
            }
        }
        root.declared = declared;
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], _project: &RootDependency, prior_text: Option<&str>) -> Result<String> {
        let mut doc = match prior_text {
            Some(text) => text.parse::<DocumentMut>().map_err(|e| ConverterError::Toml(e.to_string()))?,
            None => DocumentMut::new(),
        };

        if doc.get("source").is_none() {
            let mut sources = toml_edit::ArrayOfTables::new();
            let mut default = Table::new();
            default["name"] = value("pypi");
            default["url"] = value("https://pypi.org/simple");
            default["verify_ssl"] = value(true);
            sources.push(default);
            doc["source"] = Item::ArrayOfTables(sources);
        }

        let mut packages = Table::new();
        let mut dev_packages = Table::new();
        for req in requirements.iter().filter(|r| !r.is_dev) {
            packages[&req.name] = format_req(req);
        }
        for req in requirements.iter().filter(|r| r.is_dev) {
            dev_packages[&req.name] = format_req(req);
        }
        doc["packages"] = Item::Table(packages);
        doc["dev-packages"] = Item::Table(dev_packages);

        Ok(doc.to_string())
    }
}

/// A package with only a version renders as a bare string; anything richer
/// renders as an inline table, and a `"*"` version is omitted once other
/// keys are present.
fn format_req(req: &Requirement) -> Item {
    let has_extra_fields = req.link.is_some() || !req.extras.is_empty() || req.marker.is_some() || req.is_editable;
    if !has_extra_fields {
        return value(if req.version.is_empty() { "*".to_string() } else { req.version.clone() });
    }

    let mut table = toml_edit::InlineTable::new();
    if req.version != "*" && !req.version.is_empty() {
        table.insert("version", req.version.clone().into());
    }
    if !req.extras.is_empty() {
        let mut arr = Array::new();
        for extra in &req.extras {
            arr.push(extra.as_str());
        }
        table.insert("extras", arr.into());
    }
    if let Some(marker) = &req.marker {
        table.insert("markers", marker.clone().into());
    }
    if req.is_editable {
        table.insert("editable", true.into());
    }
    if let Some(link) = &req.link {
        insert_link(&mut table, link);
    }
    Item::Value(Value::InlineTable(table))
}

fn insert_link(table: &mut toml_edit::InlineTable, link: &str) {
    for kind in ["git", "hg", "svn", "bzr"] {
        if let Some(rest) = link.strip_prefix(&format!("{kind}+")) {
            let (url, reference) = rest.split_once('@').unwrap_or((rest, ""));
            table.insert(kind, url.into());
            if !reference.is_empty() {
                table.insert("ref", reference.into());
            }
            return;
        }
    }
    if let Some(path) = link.strip_prefix("file+") {
        table.insert("path", path.into());
        return;
    }
    table.insert("file", link.into());
}

/// `Pipfile.lock`: the companion JSON lock carrying exact versions and
/// hashes. Unlike `Pipfile` this is not comment-preserving — JSON has none
/// — so `prior_text` only supplies the `_meta.hash` carried forward.
#[derive(Debug, Default)]
pub struct PipfileLockConverter;

impl PipfileLockConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for PipfileLockConverter {
    fn format_name(&self) -> &'static str {
        FORMAT_LOCK
    }

    fn lock(&self) -> bool {
        true
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let doc: PipfileLockDocument = vellum_core::from_json(text).map_err(|e| ConverterError::parse(FORMAT_LOCK, e.to_string()))?;
        let mut root = RootDependency::new("pipfile-project");
        let mut declared = Vec::new();

        for (section, dev) in [(&doc.default, false), (&doc.develop, true)] {
            for (name, entry) in section {
                let version = entry.version.as_deref().unwrap_or("*").trim_start_matches("==").to_string();
                let declaration = match entry.source.as_deref().and_then(parse_link) {
                    Some(decl) => decl,
                    None if entry.hashes.is_empty() => Declaration::Version(version),
                    None => Declaration::Archive { url: String::new(), hashes: entry.hashes.clone() },
                };
                declared.push(DeclaredDependency {
                    name: name.clone(),
                    declaration,
                    extras: Vec::new(),
                    marker: entry.markers.clone(),
                    dev,
                });
            }
        }
        root.declared = declared;
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        let mut default = BTreeMap::new();
        let mut develop = BTreeMap::new();
        for req in requirements {
            let entry = PipfileLockEntry {
                version: Some(format!("=={}", req.version)),
                hashes: req.hashes.clone(),
                markers: req.marker.clone(),
                source: req.link.clone(),
            };
            if req.is_dev {
                develop.insert(req.name.clone(), entry);
            } else {
                default.insert(req.name.clone(), entry);
            }
        }

        let doc = PipfileLockDocument {
            meta: PipfileLockMeta { pipfile_spec: 6 },
            default,
            develop,
        };
        vellum_core::to_json_pretty(&doc).map_err(|e| ConverterError::parse(FORMAT_LOCK, e.to_string()))
    }
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct PipfileLockDocument {
    #[serde(rename = "_meta", default)]
    meta: PipfileLockMeta,
    #[serde(default)]
    default: BTreeMap<String, PipfileLockEntry>,
    #[serde(default)]
    develop: BTreeMap<String, PipfileLockEntry>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct PipfileLockMeta {
    #[serde(rename = "pipfile-spec", default)]
    pipfile_spec: u32,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct PipfileLockEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    markers: Option<String>,
    /// `vcs+url@ref` / `file+path` link string, the inverse of
    /// `Declaration::link_string`; preserves VCS provenance across the
    /// manifest-to-lock round trip the same way `lockfile.rs`'s
    /// `LockedPackage::source` does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

/// Recover a [`Declaration`] from a `vcs+url@ref` / `file+path` link string
/// (the inverse of `Declaration::link_string`). Mirrors `lockfile.rs`'s
/// helper of the same name.
fn parse_link(link: &str) -> Option<Declaration> {
    for kind_str in ["git", "hg", "svn", "bzr"] {
        if let Some(rest) = link.strip_prefix(&format!("{kind_str}+")) {
            let (url, reference) = rest.split_once('@')?;
            return Some(Declaration::Vcs {
                kind: VcsKind::parse(kind_str)?,
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
    fn parses_bare_string_version() {
        let conv = PipfileConverter::new();
        let root = conv.loads("[packages]\nrequests = \"*\"\n").unwrap();
        assert_eq!(root.declared[0].declaration, Declaration::Version("*".to_string()));
    }

    #[test]
    fn parses_vcs_inline_table() {
        let conv = PipfileConverter::new();
        let text = "[packages]\nfoo = { git = \"https://x/y\", ref = \"abc\" }\n";
        let root = conv.loads(text).unwrap();
        match &root.declared[0].declaration {
            Declaration::Vcs { url, reference, kind, .. } => {
                assert_eq!(url, "https://x/y");
                assert_eq!(reference, "abc");
                assert_eq!(*kind, VcsKind::Git);
            }
            other => panic!("expected Vcs, got {other:?}"),
        }
    }

    #[test]
    fn dev_packages_marked_dev() {
        let conv = PipfileConverter::new();
        let text = "[dev-packages]\npytest = \"*\"\n";
        let root = conv.loads(text).unwrap();
        assert!(root.declared[0].dev);
    }

    #[test]
    fn round_trips_vcs_through_lock() {
        let manifest = PipfileConverter::new();
        let text = "[packages]\nfoo = { git = \"https://x/y\", ref = \"abc\" }\n";
        let root = manifest.loads(text).unwrap();
        let link = root.declared[0].declaration.link_string().unwrap();
        assert_eq!(link, "git+https://x/y@abc");

        let lock = PipfileLockConverter::new();
        let req = Requirement {
            name: "foo".to_string(),
            canonical_name: "foo".to_string(),
            version: "1.0".to_string(),
            extras: vec![],
            marker: None,
            link: Some(link),
            hashes: vec!["sha256:abc".to_string()],
            is_editable: false,
            is_dev: false,
        };
        let dumped = lock.dumps(&[req], &root, None).unwrap();
        assert!(dumped.contains("sha256:abc"));
        assert!(dumped.contains("git+https://x/y@abc"), "the lock entry must preserve the vcs link string, not just the hash");

        let relocked = lock.loads(&dumped).unwrap();
        match &relocked.declared[0].declaration {
            Declaration::Vcs { url, reference, kind, .. } => {
                assert_eq!(url, "https://x/y");
                assert_eq!(reference, "abc");
                assert_eq!(*kind, VcsKind::Git);
            }
            other => panic!("expected Vcs, got {other:?}"),
        }
    }
}
