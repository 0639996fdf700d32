//! Content-addressed HTTP response cache.
//!
//! Keyed by the request URL (plus any vary-relevant header values the caller
//! folds into the key), entries are content-addressed by a BLAKE3 hash of
//! the body so two URLs that happen to serve byte-identical bodies share
//! storage. Concurrent requests for the same key are deduplicated: only the
//! first caller's fetch future actually runs, and every other caller awaits
//! its result via [`moka::future::Cache::try_get_with`].

use bytes::Bytes;
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

/// Key identifying a cached HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a URL string, optionally qualified with a vary tag
    /// (e.g. an `Accept` header) so differently-negotiated responses for
    /// the same URL don't collide.
    #[must_use]
    pub fn new(url: impl AsRef<str>, vary: Option<&str>) -> Self {
        match vary {
            Some(v) => Self(format!("{}#{v}", url.as_ref())),
            None => Self(url.as_ref().to_string()),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cached response body plus its content hash.
#[derive(Debug, Clone)]
pub struct HttpCacheEntry {
    /// The response body.
    pub body: Bytes,
    /// BLAKE3 hash of `body`, hex-encoded.
    pub content_hash: String,
}

impl HttpCacheEntry {
    /// Wrap a body, computing its content hash.
    #[must_use]
    pub fn new(body: Bytes) -> Self {
        let content_hash = blake3::hash(&body).to_hex().to_string();
        Self { body, content_hash }
    }
}

/// Process-wide cache of HTTP response bodies, shared across every
/// `IndexRepository` a resolve touches.
#[derive(Debug, Clone)]
pub struct HttpCache {
    inner: Cache<CacheKey, Arc<HttpCacheEntry>>,
}

impl HttpCache {
    /// Build a cache capped at `max_entries` distinct responses.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Fetch-or-return-cached for `key`. If another caller is already
    /// fetching the same key, this awaits that caller's result instead of
    /// issuing a second request.
    ///
    /// # Errors
    /// Propagates whatever error `fetch` returns.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Arc<HttpCacheEntry>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Bytes, E>>,
        E: Clone + std::fmt::Debug + Send + Sync + 'static,
    {
        let entry = self
            .inner
            .try_get_with(key.clone(), async move {
                let body = fetch().await?;
                Ok::<_, E>(Arc::new(HttpCacheEntry::new(body)))
            })
            .await
            .map_err(|e: Arc<E>| (*e).clone())?;
        debug!(%key, hash = %entry.content_hash, "http cache resolved");
        Ok(entry)
    }

    /// Number of entries currently cached.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_fetches_for_same_key_run_once() {
        let cache = HttpCache::new(100);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(CacheKey::new("https://example.test/pkg.json", None), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok::<_, String>(Bytes::from_static(b"{}"))
                    })
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_are_independent() {
        let cache = HttpCache::new(100);
        let a = cache
            .get_or_fetch(CacheKey::new("https://example.test/a", None), || async {
                Ok::<_, String>(Bytes::from_static(b"a"))
            })
            .await
            .unwrap();
        let b = cache
            .get_or_fetch(CacheKey::new("https://example.test/b", None), || async {
                Ok::<_, String>(Bytes::from_static(b"b"))
            })
            .await
            .unwrap();
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[tokio::test]
    async fn fetch_errors_are_not_cached_permanently() {
        let cache = HttpCache::new(100);
        let key = CacheKey::new("https://example.test/flaky", None);
        let first = cache
            .get_or_fetch(key.clone(), || async { Err::<Bytes, String>("boom".into()) })
            .await;
        assert!(first.is_err());

        let second = cache
            .get_or_fetch(key, || async { Ok::<_, String>(Bytes::from_static(b"ok")) })
            .await;
        assert!(second.is_ok());
    }
}
