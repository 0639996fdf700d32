//! Mercurial client: shells out to `hg clone -u <rev>` and reads the
//! resulting working copy's tip revision.

use crate::credentials::inject_credentials;
use crate::error::Result;
use crate::shell::run;
use crate::types::Checkout;
use std::path::Path;

#[derive(Debug, Default)]
pub struct HgClient;

impl HgClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// See [`crate::shell::run`].
    pub fn checkout(&self, url: &str, reference: &str, dest: &Path) -> Result<Checkout> {
        let url = inject_credentials(url);
        run("hg", &["clone", "-u", reference, url.as_str(), &dest.to_string_lossy()], None)?;
        let commit = run("hg", &["identify", "--id"], Some(dest))?;
        Ok(Checkout {
            path: dest.to_path_buf(),
            resolved_commit: commit,
        })
    }
}
