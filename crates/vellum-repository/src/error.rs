//! Repository-specific error plumbing. The `Repository` trait itself
//! returns [`vellum_core::error::RepoError`] directly; this module only adds
//! the conversions an implementation needs to produce one from a JSON
//! decode failure or an HTTP transport error.

use vellum_core::error::RepoError;

pub fn network(url: impl Into<String>, err: &reqwest::Error) -> RepoError {
    RepoError::Network {
        url: url.into(),
        message: err.to_string(),
    }
}

pub fn bad_document(name: impl Into<String>, reason: impl Into<String>) -> RepoError {
    RepoError::NoMatchingVersion {
        name: name.into(),
        reason: reason.into(),
    }
}
