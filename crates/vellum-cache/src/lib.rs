//! Shared caches used while resolving and converting: a content-addressed
//! HTTP response cache, and a clone-lock cache for VCS repositories.
//!
//! Both caches live for the lifetime of one resolve and are shared across
//! every repository a [`Resolver`](vellum_core) consults, so two concurrent
//! lookups for the same URL or the same `(vcs url, ref)` pair never race
//! each other into doing the work twice.

mod http;
mod vcs_lock;

pub use http::{CacheKey, HttpCache, HttpCacheEntry};
pub use vcs_lock::{CloneKey, VcsCloneCache};
