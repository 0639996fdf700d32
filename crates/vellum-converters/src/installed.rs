//! The installed-packages inspector: a read-only view over whatever is
//! already present in an environment, in the `pip freeze`-style `name==version`
//! grid. There is nothing to write back — installed state is a fact about
//! the filesystem, not something a converter run produces.

use crate::error::{ConverterError, Result};
use crate::Converter;
use vellum_resolver::declaration::Declaration;
use vellum_resolver::dependency::{DeclaredDependency, RootDependency};
use vellum_resolver::requirement::Requirement;

const FORMAT: &str = "installed";

#[derive(Debug, Default)]
pub struct InstalledConverter;

impl InstalledConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Converter for InstalledConverter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn lock(&self) -> bool {
        true
    }

    fn loads(&self, text: &str) -> Result<RootDependency> {
        let mut root = RootDependency::new("installed");
        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // `pip freeze` emits either `name==version` or, for editable
            // checkouts, `-e path-or-url` with no version at all.
            if let Some(rest) = line.strip_prefix("-e ") {
                root.declared.push(DeclaredDependency {
                    name: "unknown".to_string(),
                    declaration: Declaration::LocalPath { path: rest.trim().to_string(), editable: true },
                    extras: Vec::new(),
                    marker: None,
                    dev: false,
                });
                continue;
            }
            let Some((name, version)) = line.split_once("==") else {
                return Err(ConverterError::parse_at(FORMAT, format!("line {}", lineno + 1), format!("expected 'name==version', got '{line}'")));
            };
            root.declared.push(DeclaredDependency {
                name: name.trim().to_string(),
                declaration: Declaration::Version(format!("=={}", version.trim())),
                extras: Vec::new(),
                marker: None,
                dev: false,
            });
        }
        Ok(root)
    }

    fn dumps(&self, _requirements: &[Requirement], _project: &RootDependency, _prior_text: Option<&str>) -> Result<String> {
        Err(ConverterError::ReadOnly { format: FORMAT })
    }
}
