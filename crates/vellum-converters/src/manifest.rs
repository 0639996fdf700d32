//! The TOML-based project manifest: a `[build-system]` table plus a
//! `[project]` table carrying `dependencies` as an array of PEP 508
//! requirement strings. Ranges, not pins — `lock()` is `false`.

use crate::error::{ConverterError, Result};
use crate::Converter;
use serde::{Deserialize, Serialize};
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::{Author, DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "pyproject-manifest";

#[derive(Debug, Default)]
pub struct ManifestConverter;

impl ManifestConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestDocument {
    #[serde(rename = "build-system", default)]
    build_system: Option<BuildSystem>,
    #[serde(default)]
    project: Option<Project>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BuildSystem {
    #[serde(default)]
    requires: Vec<String>,
    #[serde(rename = "build-backend", default)]
    build_backend: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Project {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    readme: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(rename = "requires-python", default)]
    requires_python: Option<String>,
    #[serde(default)]
    authors: Vec<ManifestAuthor>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(rename = "optional-dependencies", default)]
    optional_dependencies: std::collections::BTreeMap<String, Vec<String>>,
    #[serde(rename = "urls", default)]
    urls: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: Option<String>,
}

/// Parse a single PEP 508 requirement string: `name[extras]>=1.0; marker`.
fn parse_requirement_string(raw: &str) -> Result<DeclaredDependency> {
    let raw = raw.trim();
    let split_at = raw.find(|c: char| "=<>!~;".contains(c)).unwrap_or(raw.len());
    let (name_and_extras, rest) = raw.split_at(split_at);
    let (body, marker) = rest.split_once(';').map_or((rest, None), |(b, m)| (b, Some(m.trim().to_string())));

    let (name, extras) = if let Some(open) = name_and_extras.find('[') {
        let close = name_and_extras[open..]
            .find(']')
            .ok_or_else(|| ConverterError::parse(FORMAT, format!("unterminated extras in '{raw}'")))?;
        let name = name_and_extras[..open].trim();
        let extras = name_and_extras[open + 1..open + close]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        (name, extras)
    } else {
        (name_and_extras.trim(), Vec::new())
    };

    if name.is_empty() {
        return Err(ConverterError::parse(FORMAT, format!("empty package name in '{raw}'")));
    }

    let range = body.trim();
    Ok(DeclaredDependency {
        name: name.to_string(),
        declaration: Declaration::Version(if range.is_empty() { "*".to_string() } else { range.to_string() }),
        extras,
        marker,
        dev: false,
    })
}

fn format_requirement_string(req: &Requirement) -> String {
    let mut out = req.name.clone();
    if !req.extras.is_empty() {
        out.push('[');
        out.push_str(&req.extras.join(","));
        out.push(']');
    }
    if !req.version.is_empty() && req.version != "*" {
        out.push_str(&req.version);
    }
    if let Some(marker) = &req.marker {
        out.push_str("; ");
        out.push_str(marker);
    }
    out
}

impl Converter for ManifestConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let doc: ManifestDocument = toml::from_str(text).map_err(|e| ConverterError::Toml(e.to_string()))?;
        let project = doc.project.ok_or_else(|| ConverterError::parse(FORMAT, "missing [project] table"))?;

        let mut root = RootDependency::new(project.name);
        root.version = project.version;
        root.description = project.description;
        root.readme = project.readme;
        root.license = project.license;
        root.runtime_requires = project.requires_python;
        root.url = project.urls.get("Homepage").cloned();
        root.authors = project
            .authors
            .into_iter()
            .map(|a| Author { name: a.name, email: a.email })
            .collect();

        let mut declared = Vec::new();
        for raw in &project.dependencies {
            declared.push(parse_requirement_string(raw)?);
        }
        for (group, reqs) in &project.optional_dependencies {
            for raw in reqs {
                let mut dep = parse_requirement_string(raw)?;
                dep.dev = group.as_str() != "main";
                declared.push(dep);
            }
        }
        root.declared = declared;
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], project: &RootDependency, prior_text: Option<&str>) -> Result<String> {
        let mut doc: ManifestDocument = match prior_text {
            Some(text) => toml::from_str(text).map_err(|e| ConverterError::Toml(e.to_string()))?,
            None => ManifestDocument::default(),
        };

        let mut proj = doc.project.unwrap_or_default();
        proj.name = project.name.clone();
        proj.version.clone_from(&project.version);
        proj.description.clone_from(&project.description);
        proj.readme.clone_from(&project.readme);
        proj.license.clone_from(&project.license);
        proj.requires_python.clone_from(&project.runtime_requires);
        proj.authors = project
            .authors
            .iter()
            .map(|a| ManifestAuthor { name: a.name.clone(), email: a.email.clone() })
            .collect();

        proj.dependencies = requirements.iter().filter(|r| !r.is_dev).map(format_requirement_string).collect();

        let dev: Vec<String> = requirements.iter().filter(|r| r.is_dev).map(format_requirement_string).collect();
        if dev.is_empty() {
            proj.optional_dependencies.remove("dev");
        } else {
            proj.optional_dependencies.insert("dev".to_string(), dev);
        }

        doc.project = Some(proj);
        if doc.build_system.is_none() {
            doc.build_system = Some(BuildSystem {
                requires: vec!["setuptools".to_string(), "wheel".to_string()],
                build_backend: Some("setuptools.build_meta".to_string()),
            });
        }

        toml::to_string_pretty(&doc).map_err(|e| ConverterError::TomlSer(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_table() {
        let conv = ManifestConverter::new();
        let text = r#"
[project]
name = "demo"
version = "1.0.0"
dependencies = ["requests>=2.0,<3", "click"]
"#;
        let root = conv.loads(text).unwrap();
        assert_eq!(root.name, "demo");
        assert_eq!(root.declared.len(), 2);
        assert_eq!(root.declared[0].name, "requests");
        assert_eq!(root.declared[1].declaration, Declaration::Version("*".to_string()));
    }

    #[test]
    fn round_trips_dependency_list() {
        let conv = ManifestConverter::new();
        let project = RootDependency::new("demo");
        let reqs = vec![Requirement {
            name: "requests".to_string(),
            canonical_name: "requests".to_string(),
            version: ">=2.0".to_string(),
            extras: vec!["security".to_string()],
            marker: None,
            link: None,
            hashes: vec![],
            is_editable: false,
            is_dev: false,
        }];
        let dumped = conv.dumps(&reqs, &project, None).unwrap();
        let reparsed = conv.loads(&dumped).unwrap();
        assert_eq!(reparsed.declared[0].name, "requests");
        assert_eq!(reparsed.declared[0].extras, vec!["security".to_string()]);
    }

    #[test]
    fn dev_dependency_survives_round_trip() {
        let conv = ManifestConverter::new();
        let project = RootDependency::new("demo");
        let reqs = vec![
            Requirement {
                name: "requests".to_string(),
                canonical_name: "requests".to_string(),
                version: ">=2.0".to_string(),
                extras: vec![],
                marker: None,
                link: None,
                hashes: vec![],
                is_editable: false,
                is_dev: false,
            },
            Requirement {
                name: "pytest".to_string(),
                canonical_name: "pytest".to_string(),
                version: ">=7.0".to_string(),
                extras: vec![],
                marker: None,
                link: None,
                hashes: vec![],
                is_editable: false,
                is_dev: true,
            },
        ];
        let dumped = conv.dumps(&reqs, &project, None).unwrap();
        assert!(dumped.contains("pytest"), "dev dependency must not be silently dropped");

        let reparsed = conv.loads(&dumped).unwrap();
        assert_eq!(reparsed.declared.len(), 2);
        let pytest = reparsed.declared.iter().find(|d| d.name == "pytest").unwrap();
        assert!(pytest.dev, "round-tripped pytest must still be marked dev");
        let requests = reparsed.declared.iter().find(|d| d.name == "requests").unwrap();
        assert!(!requests.dev);
    }
}
