//! Bazaar client: shells out to `bzr branch -r <rev>`. Kept alongside
//! hg/svn since `VcsKind` names all four systems a declaration can point
//! at, even though Bazaar checkouts are rare in practice.

use crate::credentials::inject_credentials;
use crate::error::Result;
use crate::shell::run;
use crate::types::Checkout;
use std::path::Path;

#[derive(Debug, Default)]
pub struct BzrClient;

impl BzrClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// See [`crate::shell::run`].
    pub fn checkout(&self, url: &str, reference: &str, dest: &Path) -> Result<Checkout> {
        let url = inject_credentials(url);
        let mut args = vec!["branch"];
        if !reference.is_empty() {
            args.push("-r");
            args.push(reference);
        }
        args.push(url.as_str());
        let dest_str = dest.to_string_lossy().into_owned();
        args.push(&dest_str);
        run("bzr", &args, None)?;
        let revno = run("bzr", &["revno"], Some(dest))?;
        Ok(Checkout {
            path: dest.to_path_buf(),
            resolved_commit: revno,
        })
    }
}
