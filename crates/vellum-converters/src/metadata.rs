//! The archive metadata format: the `PKG-INFO` / `METADATA` file bundled
//! inside a built distribution, an RFC 822-style header block terminated by
//! a blank-line-separated long description. Read-only — metadata files are
//! generated by a build backend, never hand-authored, so `dumps` has nothing
//! to round-trip against.

use crate::error::{ConverterError, Result};
use crate::Converter;
use vellum_resolver::dependency::{Author, DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "metadata";

#[derive(Debug, Default)]
pub struct MetadataConverter;

impl MetadataConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Parse one `Requires-Dist: name[extras] (range); marker` header value,
/// the wheel-METADATA spelling of a PEP 508 requirement (parentheses around
/// the version range are optional and stripped if present).
fn parse_requires_dist(raw: &str) -> Result<DeclaredDependency> {
    let raw = raw.trim();
    let (body, marker) = raw.split_once(';').map_or((raw, None), |(b, m)| (b, Some(m.trim().to_string())));
    let body = body.trim();

    let split_at = body.find(|c: char| "([=<>!~".contains(c)).unwrap_or(body.len());
    let (name_part, rest) = body.split_at(split_at);

    let (name, extras) = if let Some(open) = name_part.find('[') {
        let close = name_part[open..]
            .find(']')
            .ok_or_else(|| ConverterError::parse(FORMAT, format!("unterminated extras in '{raw}'")))?;
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
        return Err(ConverterError::parse(FORMAT, format!("empty package name in '{raw}'")));
    }

    let range = rest.trim().trim_start_matches('(').trim_end_matches(')').trim();
    Ok(DeclaredDependency {
        name: name.to_string(),
        declaration: vellum_resolver::declaration::Declaration::Version(if range.is_empty() { "*".to_string() } else { range.to_string() }),
        extras,
        marker,
        dev: false,
    })
}

impl Converter for MetadataConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        // A built archive's metadata names its build-time requirements as
        // ranges, same as a manifest; it carries no resolved pins of its own.
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let mut root = RootDependency::default();
        let mut author_name = None;
        let mut author_email = None;

        for raw_line in text.lines() {
            // The long description begins at the first blank line; headers end there.
            if raw_line.is_empty() {
                break;
            }
            let Some((key, value)) = raw_line.split_once(':') else { continue };
            let value = value.trim();
            match key.trim() {
                "Name" => root.name = value.to_string(),
                "Version" => root.version = Some(value.to_string()),
                "Summary" => root.description = Some(value.to_string()),
                "License" => root.license = Some(value.to_string()),
                "Requires-Python" => root.runtime_requires = Some(value.to_string()),
                "Home-page" => root.url = Some(value.to_string()),
                "Author" => author_name = Some(value.to_string()),
                "Author-email" => author_email = Some(value.to_string()),
                "Requires-Dist" => root.declared.push(parse_requires_dist(value)?),
                _ => {}
            }
        }

        if author_name.is_some() || author_email.is_some() {
            root.authors.push(Author {
                name: author_name.unwrap_or_default(),
                email: author_email,
            });
        }

        Ok(root)
    }

    fn dumps(&self, _requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        Err(ConverterError::ReadOnly { format: FORMAT })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_block() {
        let conv = MetadataConverter::new();
        let text = "Metadata-Version: 2.1\nName: demo\nVersion: 1.0.0\nRequires-Dist: requests (>=2.0,<3)\nRequires-Dist: click[colorama] ; extra == \"cli\"\n\nA long description.\n";
        let root = conv.loads(text).unwrap();
        assert_eq!(root.name, "demo");
        assert_eq!(root.version.as_deref(), Some("1.0.0"));
        assert_eq!(root.declared.len(), 2);
        assert_eq!(root.declared[0].name, "requests");
        assert_eq!(root.declared[1].extras, vec!["colorama".to_string()]);
    }

    #[test]
    fn dumps_is_read_only() {
        let conv = MetadataConverter::new();
        let err = conv.dumps(&[], &RootDependency::new("x"), None).unwrap_err();
        assert!(matches!(err, ConverterError::ReadOnly { .. }));
    }
}
