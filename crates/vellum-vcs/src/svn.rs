//! Subversion client: shells out to `svn checkout -r <rev>`. Unlike git/hg,
//! a bare Subversion "reference" is a revision number or `HEAD`; there is
//! no separate branch/tag concept at the protocol level (branches and tags
//! are just paths under the repository root, already baked into `url`).

use crate::credentials::inject_credentials;
use crate::error::Result;
use crate::shell::run;
use crate::types::Checkout;
use std::path::Path;

#[derive(Debug, Default)]
pub struct SvnClient;

impl SvnClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// See [`crate::shell::run`].
    pub fn checkout(&self, url: &str, reference: &str, dest: &Path) -> Result<Checkout> {
        let url = inject_credentials(url);
        let revision = if reference.is_empty() { "HEAD" } else { reference };
        run("svn", &["checkout", "-r", revision, url.as_str(), &dest.to_string_lossy()], None)?;
        let info = run("svnversion", &[], Some(dest))?;
        Ok(Checkout {
            path: dest.to_path_buf(),
            resolved_commit: info,
        })
    }
}
