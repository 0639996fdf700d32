//! The index-package-requirements text format: pip's `requirements.txt`
//! grammar. One requirement per line:
//!
//! ```text
//! name[extras]>=1.0,<2.0; python_version >= "3.8"
//! -e git+https://example.test/pkg.git@main#egg=pkg
//! -r other-requirements.txt
//! pinned==1.2.3 --hash=sha256:deadbeef
//! ```
//!
//! Comments (`#`) and blank lines are preserved only insofar as they're
//! dropped on `loads` and not reconstructed on `dumps` — this format is not
//! whitespace-preserving, so `prior_text` is ignored.

use crate::error::{ConverterError, Result};
use crate::Converter;
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::{DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "requirements.txt";

#[derive(Debug, Default)]
pub struct RequirementsTxtConverter;

impl RequirementsTxtConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Split `name[extra1,extra2]` from a requirement's name segment.
fn split_extras(raw: &str) -> (&str, Vec<String>) {
    if let Some(open) = raw.find('[') {
        if let Some(close) = raw[open..].find(']') {
            let name = &raw[..open];
            let extras = raw[open + 1..open + close]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            return (name, extras);
        }
    }
    (raw, Vec::new())
}

/// Split a requirement line's `; marker` suffix off.
fn split_marker(line: &str) -> (&str, Option<String>) {
    line.split_once(';')
        .map_or((line, None), |(lhs, rhs)| (lhs.trim(), Some(rhs.trim().to_string())))
}

impl Converter for RequirementsTxtConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let mut root = RootDependency::new("requirements");
        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Strip trailing `--hash=...` tokens; they attach to the
            // requirement but don't change how it's named/ranged.
            let mut hashes = Vec::new();
            let mut body = line.to_string();
            while let Some(idx) = body.find("--hash=") {
                let rest = &body[idx + "--hash=".len()..];
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                hashes.push(rest[..end].to_string());
                body = format!("{}{}", &body[..idx], &rest[end..]);
            }
            let body = body.trim();

            if let Some(path) = body.strip_prefix("-r ").or_else(|| body.strip_prefix("--requirement ")) {
                // Recursive file includes are a caller concern; record the
                // reference so a caller can chase it.
                root.entry_points.insert(format!("-r:{lineno}"), path.trim().to_string());
                continue;
            }

            if let Some(spec) = body.strip_prefix("-e ").or_else(|| body.strip_prefix("--editable ")) {
                let (url, egg) = parse_vcs_or_path_url(spec.trim());
                let name = egg.unwrap_or_else(|| "unknown".to_string());
                root.declared.push(DeclaredDependency {
                    name,
                    declaration: url,
                    extras: Vec::new(),
                    marker: None,
                    dev: false,
                });
                continue;
            }

            let (without_marker, marker) = split_marker(body);
            let without_marker = without_marker.trim();

            // A direct VCS/URL reference with no comparator operators at all.
            if without_marker.contains("://") {
                let (url, egg) = parse_vcs_or_path_url(without_marker);
                let name = egg.unwrap_or_else(|| "unknown".to_string());
                root.declared.push(DeclaredDependency {
                    name,
                    declaration: url,
                    extras: Vec::new(),
                    marker,
                    dev: false,
                });
                continue;
            }

            let split_at = without_marker
                .find(|c: char| "=<>!~".contains(c))
                .unwrap_or(without_marker.len());
            let (name_part, range_part) = without_marker.split_at(split_at);
            let (name, extras) = split_extras(name_part.trim());
            if name.is_empty() {
                return Err(ConverterError::parse_at(FORMAT, format!("line {}", lineno + 1), "missing package name"));
            }
            let declaration = Declaration::Version(if range_part.trim().is_empty() {
                "*".to_string()
            } else {
                range_part.trim().to_string()
            });
            let _ = &hashes; // hashes surface via the lock formats; req.txt only records the range here.
            root.declared.push(DeclaredDependency {
                name: name.to_string(),
                declaration,
                extras,
                marker,
                dev: false,
            });
        }
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        let mut out = String::new();
        for req in requirements {
            if let Some(link) = &req.link {
                if req.is_editable {
                    out.push_str("-e ");
                }
                out.push_str(link);
                out.push_str(&format!("#egg={}\n", req.name));
                continue;
            }

            out.push_str(&req.name);
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
            for hash in &req.hashes {
                out.push_str(" --hash=");
                out.push_str(hash);
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Parse `git+https://host/repo.git@ref#egg=name`-shaped URLs (PEP 508
/// direct references) into a [`Declaration`] plus an optional extracted
/// package name from the `#egg=` fragment.
fn parse_vcs_or_path_url(spec: &str) -> (Declaration, Option<String>) {
    let (url_part, egg) = spec
        .split_once("#egg=")
        .map_or((spec, None), |(u, e)| (u, Some(e.to_string())));

    for kind_str in ["git", "hg", "svn", "bzr"] {
        if let Some(rest) = url_part.strip_prefix(&format!("{kind_str}+")) {
            let kind = vellum_resolver::declaration::VcsKind::parse(kind_str).expect("known kind");
            let (url, reference) = rest.split_once('@').map_or((rest, String::new()), |(u, r)| (u, r.to_string()));
            return (
                Declaration::Vcs {
                    kind,
                    url: url.to_string(),
                    reference,
                    subdirectory: None,
                },
                egg,
            );
        }
    }

    (
        Declaration::Archive {
            url: url_part.to_string(),
            hashes: Vec::new(),
        },
        egg,
    )
}
