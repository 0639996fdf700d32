//! Git client backed by `gix`, used for the VCS repository variant's `git`
//! kind. Every checkout is a shallow, single-ref clone into a fresh
//! directory under the caller's clone cache — never a working copy the
//! resolver mutates in place.

use crate::credentials::inject_credentials;
use crate::error::{Result, VcsError};
use crate::types::Checkout;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct GitClient;

impl GitClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Clone `url` at `reference` (a branch, tag, or commit) into `dest`,
    /// returning the resolved commit id.
    ///
    /// # Errors
    /// [`VcsError::Git`] if the remote cannot be reached or `reference`
    /// does not exist.
    pub fn checkout(&self, url: &str, reference: &str, dest: &Path) -> Result<Checkout> {
        let url = inject_credentials(url);
        debug!(url = %redact(&url), reference, dest = %dest.display(), "git checkout");

        let prepare = gix::prepare_clone(url.as_str(), dest).map_err(|e| VcsError::Git {
            url: redact(&url),
            message: e.to_string(),
        })?;

        let (mut checkout, _) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| VcsError::Git {
                url: redact(&url),
                message: e.to_string(),
            })?;

        let (repo, _) = checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| VcsError::Git {
                url: redact(&url),
                message: e.to_string(),
            })?;

        let commit_id = resolve_reference(&repo, reference).map_err(|e| VcsError::Git {
            url: redact(&url),
            message: e,
        })?;

        Ok(Checkout {
            path: dest.to_path_buf(),
            resolved_commit: commit_id,
        })
    }
}

fn resolve_reference(repo: &gix::Repository, reference: &str) -> std::result::Result<String, String> {
    repo.rev_parse_single(reference)
        .map(|id| id.detach().to_string())
        .map_err(|e| format!("could not resolve '{reference}': {e}"))
}

/// Strip userinfo before a URL reaches a log line or error message.
fn redact(url: &str) -> String {
    url::Url::parse(url).map_or_else(
        |_| url.to_string(),
        |mut u| {
            let _ = u.set_username("");
            let _ = u.set_password(None);
            u.to_string()
        },
    )
}
