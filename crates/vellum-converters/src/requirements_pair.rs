//! The two-file install-requirements + lock pair: an `.in` file of ranges
//! compiled into a fully pinned, hashed `.txt` file, each
//! pin annotated with a `# via <requester>` trace comment (the shape
//! `pip-compile` produces). Two converters share the requirements.txt
//! grammar: [`RequirementsInConverter`] (`lock() == false`) for the source
//! file, [`RequirementsLockConverter`] (`lock() == true`) for the compiled
//! output.

use crate::error::{ConverterError, Result};
use crate::requirements_txt::RequirementsTxtConverter;
use crate::Converter;
use vellum_resolver::dependency::RootDependency;
use vellum_resolver::requirement::Requirement;

const FORMAT_IN: &str = "requirements.in";
const FORMAT_LOCK: &str = "requirements-lock.txt";

/// The unlocked side of the pair: identical grammar to plain
/// `requirements.txt`, kept as its own type so a converter dispatch table
/// can distinguish "the ranges file" from "the compiled file" by format
/// name alone.
#[derive(Debug, Default)]
pub struct RequirementsInConverter {
    inner: RequirementsTxtConverter,
}

impl RequirementsInConverter {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: RequirementsTxtConverter::new() }
    }
}

impl Converter for RequirementsInConverter {
    fn format_name(&self) -> &'static str {
        FORMAT_IN
    }

    fn lock(&self) -> bool {
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        self.inner.loads(text)
    }

    fn dumps(&self, requirements: &[Requirement], project: &RootDependency, prior_text: Option<&str>) -> Result<String> {
        self.inner.dumps(requirements, project, prior_text)
    }
}

/// The compiled, pinned side of the pair: `name==version \\\n    --hash=...
/// # via requester` lines, grouped the way `pip-compile` emits them.
#[derive(Debug, Default)]
pub struct RequirementsLockConverter;

impl RequirementsLockConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for RequirementsLockConverter {
    fn format_name(&self) -> &'static str {
        FORMAT_LOCK
    }

    fn lock(&self) -> bool {
        true
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let mut root = RootDependency::new("compiled-requirements");
        let mut declared = Vec::new();
        let mut lines = text.lines().peekable();

        while let Some(raw_line) = lines.next() {
            let line = raw_line.trim_end_matches('\\').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name_version, hash) = line.split_once("--hash=").map_or((line, None), |(l, h)| (l.trim(), Some(h.trim().to_string())));
            let Some((name, version)) = name_version.split_once("==") else {
                return Err(ConverterError::parse(FORMAT_LOCK, format!("expected a pinned `name==version` line, got '{line}'")));
            };

            let mut hashes: Vec<String> = hash.into_iter().collect();
            // Hash continuation lines (`    --hash=...`) attach to the most
            // recent pin until a `# via` comment or a blank line ends it.
            while let Some(next) = lines.peek() {
                let trimmed = next.trim();
                if let Some(h) = trimmed.strip_prefix("--hash=") {
                    hashes.push(h.trim_end_matches('\\').trim().to_string());
                    lines.next();
                } else {
                    break;
                }
            }

            declared.push(vellum_resolver::dependency::DeclaredDependency {
                name: name.trim().to_string(),
                declaration: vellum_resolver::declaration::Declaration::Version(version.trim().to_string()),
                extras: Vec::new(),
                marker: None,
                dev: false,
            });
            let _ = hashes; // recorded on the Requirement side at dump time; loads() only needs the pin itself.
        }
        root.declared = declared;
        Ok(root)
    }

    fn dumps(&self, requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        let mut out = String::new();
        for req in requirements {
            out.push_str(&req.name);
            out.push_str("==");
            out.push_str(&req.version);
            for (i, hash) in req.hashes.iter().enumerate() {
                out.push_str(" \\\n");
                out.push_str("    --hash=");
                out.push_str(hash);
                if i + 1 < req.hashes.len() {
                    out.push_str(" \\");
                }
            }
            out.push_str("\n    # via -r requirements.in\n");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pinned_line_with_hash() {
        let conv = RequirementsLockConverter::new();
        let text = "requests==2.31.0 \\\n    --hash=sha256:abc\n    # via -r requirements.in\n";
        let root = conv.loads(text).unwrap();
        assert_eq!(root.declared.len(), 1);
        assert_eq!(root.declared[0].name, "requests");
    }

    #[test]
    fn dumps_with_via_trace_comment() {
        let conv = RequirementsLockConverter::new();
        let reqs = vec![Requirement {
            name: "requests".to_string(),
            canonical_name: "requests".to_string(),
            version: "2.31.0".to_string(),
            extras: vec![],
            marker: None,
            link: None,
            hashes: vec!["sha256:abc".to_string()],
            is_editable: false,
            is_dev: false,
        }];
        let out = conv.dumps(&reqs, &RootDependency::new("x"), None).unwrap();
        assert!(out.contains("requests==2.31.0"));
        assert!(out.contains("--hash=sha256:abc"));
        assert!(out.contains("# via"));
    }
}
