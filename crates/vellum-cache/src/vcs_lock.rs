//! VCS clone cache: one checkout per `(url, ref)` pair, with an exclusive
//! lock held for the duration of the clone so two concurrent resolves for
//! the same revision don't race each other into cloning twice.
//!
//! This is a process-local lock (a `tokio::sync::Mutex` keyed by the pair),
//! not a cross-process filesystem lock: the workspace's dependency stack
//! has no `fs2`/`fs4`-style file-locking crate, and a single `vellum`
//! invocation never runs two resolves in separate processes against the
//! same cache directory concurrently.

use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Key identifying one VCS checkout: the repository URL and the ref
/// (branch, tag, or commit) checked out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CloneKey {
    pub url: String,
    pub reference: String,
}

impl CloneKey {
    #[must_use]
    pub fn new(url: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reference: reference.into(),
        }
    }
}

/// Caches the on-disk path of each `(url, ref)` checkout, serializing clones
/// of the same pair behind a per-key lock.
#[derive(Debug, Clone, Default)]
pub struct VcsCloneCache {
    locks: Arc<DashMap<CloneKey, Arc<Mutex<Option<PathBuf>>>>>,
}

impl VcsCloneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached checkout path for `key`, cloning via `clone_fn` if
    /// this is the first request for that pair. While the clone runs, any
    /// other caller for the same `key` blocks on the same lock rather than
    /// starting a second clone.
    ///
    /// # Errors
    /// Propagates whatever error `clone_fn` returns; the slot is left empty
    /// so a later call can retry.
    pub async fn get_or_clone<F, Fut, E>(&self, key: CloneKey, clone_fn: F) -> Result<PathBuf, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<PathBuf, E>>,
    {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let mut slot = lock.lock().await;
        if let Some(path) = slot.as_ref() {
            debug!(url = %key.url, reference = %key.reference, "vcs checkout cache hit");
            return Ok(path.clone());
        }

        let path = clone_fn().await?;
        *slot = Some(path.clone());
        debug!(url = %key.url, reference = %key.reference, path = %path.display(), "vcs checkout cloned");
        Ok(path)
    }

    /// Drop a cached checkout path, forcing the next `get_or_clone` for that
    /// key to clone again (e.g. after the on-disk checkout was invalidated).
    pub fn invalidate(&self, key: &CloneKey) {
        self.locks.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_clones_for_same_key_run_once() {
        let cache = VcsCloneCache::new();
        let clones = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let clones = clones.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_clone(
                        CloneKey::new("https://example.test/repo.git", "main"),
                        || async move {
                            clones.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                            Ok::<_, String>(PathBuf::from("/tmp/checkout"))
                        },
                    )
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(clones.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_refs_clone_independently() {
        let cache = VcsCloneCache::new();
        let a = cache
            .get_or_clone(CloneKey::new("https://example.test/repo.git", "main"), || async {
                Ok::<_, String>(PathBuf::from("/tmp/main"))
            })
            .await
            .unwrap();
        let b = cache
            .get_or_clone(CloneKey::new("https://example.test/repo.git", "dev"), || async {
                Ok::<_, String>(PathBuf::from("/tmp/dev"))
            })
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn invalidate_forces_recreate() {
        let cache = VcsCloneCache::new();
        let key = CloneKey::new("https://example.test/repo.git", "main");
        let first = cache
            .get_or_clone(key.clone(), || async { Ok::<_, String>(PathBuf::from("/tmp/v1")) })
            .await
            .unwrap();
        cache.invalidate(&key);
        let second = cache
            .get_or_clone(key, || async { Ok::<_, String>(PathBuf::from("/tmp/v2")) })
            .await
            .unwrap();
        assert_eq!(first, PathBuf::from("/tmp/v1"));
        assert_eq!(second, PathBuf::from("/tmp/v2"));
    }
}
