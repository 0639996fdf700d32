//! The legacy `setup.py` reader: a static, non-executing extraction of the
//! `setup(...)` call's `install_requires`, `extras_require`, and
//! `python_requires` keyword arguments, for projects with no
//! `pyproject.toml`. Never runs the file — a regex walk over the `setup(`
//! call's keyword arguments, string literals only. Anything dynamic (a
//! function call, a
//! variable reference) is silently skipped rather than guessed at.

use crate::error::{ConverterError, Result};
use crate::Converter;
use once_cell::sync::Lazy;
use regex::Regex;
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::{DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "setup.py";

#[derive(Debug, Default)]
pub struct SetupPyConverter;

impl SetupPyConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bname\s*=\s*["']([^"']+)["']"#).unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bversion\s*=\s*["']([^"']+)["']"#).unwrap());
static PYTHON_REQUIRES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bpython_requires\s*=\s*["']([^"']+)["']"#).unwrap());
static STRING_LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

/// Extract the bracketed contents of a `key=[...]` or `key={...}` keyword
/// argument by counting brackets, since this is a static text scan rather
/// than a real parser and nested literals could otherwise confuse a naive
/// regex match.
fn extract_bracketed(text: &str, key: &str, open: char, close: char) -> Option<String> {
    let needle_pos = {
        let re = Regex::new(&format!(r"\b{}\s*=\s*\{}", regex::escape(key), open)).ok()?;
        re.find(text)?.end() - 1
    };
    let mut depth = 0i32;
    let mut end = None;
    for (i, c) in text[needle_pos..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                end = Some(needle_pos + i);
                break;
            }
        }
    }
    end.map(|e| text[needle_pos + 1..e].to_string())
}

fn parse_requirement_strings(body: &str) -> Vec<DeclaredDependency> {
    STRING_LITERAL_RE
        .captures_iter(body)
        .filter_map(|cap| {
            let raw = cap.get(1)?.as_str().trim();
            if raw.is_empty() {
                return None;
            }
            let split_at = raw.find(|c: char| "=<>!~;".contains(c)).unwrap_or(raw.len());
            let (name, rest) = raw.split_at(split_at);
            let (range, marker) = rest.split_once(';').map_or((rest, None), |(r, m)| (r, Some(m.trim().to_string())));
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(DeclaredDependency {
                name: name.to_string(),
                declaration: Declaration::Version(if range.trim().is_empty() { "*".to_string() } else { range.trim().to_string() }),
                extras: Vec::new(),
                marker,
                dev: false,
            })
        })
        .collect()
}

impl Converter for SetupPyConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        false
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        if !text.contains("setup(") && !text.contains("setup (") {
            return Err(ConverterError::parse(FORMAT, "no setup(...) call found"));
        }

        let mut root = RootDependency::new(NAME_RE.captures(text).and_then(|c| c.get(1)).map_or("unknown", |m| m.as_str()));
        root.version = VERSION_RE.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string());
        root.runtime_requires = PYTHON_REQUIRES_RE.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string());

        if let Some(body) = extract_bracketed(text, "install_requires", '[', ']') {
            root.declared.extend(parse_requirement_strings(&body));
        }

        if let Some(body) = extract_bracketed(text, "extras_require", '{', '}') {
            // Each `"group": [...]` entry inside the dict becomes its own
            // bracketed list; the dict's own braces are already stripped.
            let list_re = Regex::new(r"\[([^\[\]]*)\]").unwrap();
            for cap in list_re.captures_iter(&body) {
                let deps = parse_requirement_strings(&cap[1]);
                root.declared.extend(deps.into_iter().map(|mut d| {
                    d.dev = true;
                    d
                }));
            }
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
    fn parses_install_requires() {
        let conv = SetupPyConverter::new();
        let text = r#"
from setuptools import setup

setup(
    name="demo",
    version="1.2.3",
    python_requires=">=3.8",
    install_requires=["requests>=2.0,<3", "click"],
)
"#;
        let root = conv.loads(text).unwrap();
        assert_eq!(root.name, "demo");
        assert_eq!(root.version.as_deref(), Some("1.2.3"));
        assert_eq!(root.runtime_requires.as_deref(), Some(">=3.8"));
        assert_eq!(root.declared.len(), 2);
    }

    #[test]
    fn parses_extras_require_as_dev() {
        let conv = SetupPyConverter::new();
        let text = r#"setup(
    name="demo",
    install_requires=["requests"],
    extras_require={"test": ["pytest>=7.0"]},
)"#;
        let root = conv.loads(text).unwrap();
        let pytest = root.declared.iter().find(|d| d.name == "pytest").unwrap();
        assert!(pytest.dev);
    }

    #[test]
    fn rejects_text_without_setup_call() {
        let conv = SetupPyConverter::new();
        assert!(conv.loads("print('hello')\n").is_err());
    }

    #[test]
    fn dumps_is_read_only() {
        let conv = SetupPyConverter::new();
        assert!(conv.dumps(&[], &RootDependency::new("x"), None).is_err());
    }
}
