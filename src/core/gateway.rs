//! Bounded, cached access to a content store.
//!
//! Read paths degrade: a timeout or transport failure is logged and turned
//! into an empty listing or a missing document, so pages keep rendering
//! with partial data. Write paths propagate every failure.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::{file_key, listing_key, CachedRead, ReadCache};
use crate::adapters::{ContentStore, StoreError, StoredFile};
use crate::config::paths;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Store access with a per-call timeout and a read cache
pub struct ContentGateway {
    store: Arc<dyn ContentStore>,
    cache: Arc<dyn ReadCache>,
    timeout: Duration,
    /// Bumped on every invalidation; a read only fills the cache when no
    /// invalidation happened while it was in flight
    epoch: AtomicU64,
}

impl ContentGateway {
    pub fn new(store: Arc<dyn ContentStore>, cache: Arc<dyn ReadCache>, timeout: Duration) -> Self {
        Self {
            store,
            cache,
            timeout,
            epoch: AtomicU64::new(0),
        }
    }

    /// Name of the underlying backend
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Cache a read result unless a write overlapped the read
    fn fill(&self, key: &str, value: CachedRead, started: u64) {
        if self.epoch() == started {
            self.cache.set(key, value);
        } else {
            debug!(key, "Write overlapped read, not caching");
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    /// File names under `dir`; empty when missing or unreachable
    pub async fn list(&self, dir: &str) -> Vec<String> {
        let key = listing_key(dir);
        if let Some(CachedRead::Listing(names)) = self.cache.get(&key) {
            debug!(dir, "Listing cache hit");
            return names.unwrap_or_default();
        }

        let started = self.epoch();
        match self.bounded(self.store.list(dir)).await {
            Ok(names) => {
                self.fill(&key, CachedRead::Listing(names.clone()), started);
                names.unwrap_or_default()
            }
            Err(e) => {
                warn!(dir, error = %e, "Listing failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Read a document; `None` when missing or unreachable
    pub async fn get(&self, path: &str) -> Option<StoredFile> {
        let key = file_key(path);
        if let Some(CachedRead::File(file)) = self.cache.get(&key) {
            debug!(path, "Document cache hit");
            return file;
        }

        let started = self.epoch();
        match self.bounded(self.store.get(path)).await {
            Ok(file) => {
                self.fill(&key, CachedRead::File(file.clone()), started);
                file
            }
            Err(e) => {
                warn!(path, error = %e, "Read failed, treating as not found");
                None
            }
        }
    }

    /// Read a document from the store, bypassing the cache.
    ///
    /// Used before writes, where a stale version token would be rejected and
    /// a transport failure must not look like a missing document.
    pub async fn get_fresh(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let started = self.epoch();
        let file = self.bounded(self.store.get(path)).await?;
        self.fill(&file_key(path), CachedRead::File(file.clone()), started);
        Ok(file)
    }

    /// Create or overwrite a document
    pub async fn put(
        &self,
        path: &str,
        content: &str,
        version: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError> {
        let result = self
            .bounded(self.store.put(path, content, version, message))
            .await;
        // The outcome of a timed-out write is unknown
        self.invalidate(path);
        result
    }

    /// Delete a document
    pub async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError> {
        let result = self
            .bounded(self.store.delete(path, version, message))
            .await;
        self.invalidate(path);
        result
    }

    /// Drop cached reads a write to `path` could have made stale
    pub fn invalidate(&self, path: &str) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(&file_key(path));
        if let Some(dir) = paths::parent_dir(path) {
            self.cache.invalidate(&listing_key(dir));
        }
    }

    pub fn clear_cache(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FsStore;
    use crate::core::cache::{NoCache, TtlCache};
    use tempfile::TempDir;

    const DIR: &str = "content/fires";
    const PATH: &str = "content/fires/topic-1.md";

    fn gateway(temp: &TempDir, cache: Arc<dyn ReadCache>) -> ContentGateway {
        ContentGateway::new(Arc::new(FsStore::new(temp.path())), cache, DEFAULT_TIMEOUT)
    }

    #[tokio::test]
    async fn test_missing_reads_degrade() {
        let temp = TempDir::new().unwrap();
        let gw = gateway(&temp, Arc::new(NoCache));

        assert!(gw.list(DIR).await.is_empty());
        assert!(gw.get(PATH).await.is_none());
        assert_eq!(gw.get_fresh(PATH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_invalidates_cached_reads() {
        let temp = TempDir::new().unwrap();
        let cache = Arc::new(TtlCache::default());
        let gw = gateway(&temp, cache.clone());

        // Prime the cache with negative results
        assert!(gw.list(DIR).await.is_empty());
        assert!(gw.get(PATH).await.is_none());
        assert_eq!(cache.len(), 2);

        let version = gw.put(PATH, "v1", None, "create").await.unwrap();
        assert_eq!(gw.list(DIR).await, vec!["topic-1.md"]);
        assert_eq!(gw.get(PATH).await.unwrap().content, "v1");

        gw.delete(PATH, &version, "delete").await.unwrap();
        assert!(gw.list(DIR).await.is_empty());
        assert!(gw.get(PATH).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_serves_until_cleared() {
        let temp = TempDir::new().unwrap();
        let gw = gateway(&temp, Arc::new(TtlCache::default()));
        let store = FsStore::new(temp.path());

        assert!(gw.get(PATH).await.is_none());

        // Written behind the gateway's back
        store.put(PATH, "external", None, "create").await.unwrap();
        assert!(gw.get(PATH).await.is_none());

        gw.clear_cache();
        assert_eq!(gw.get(PATH).await.unwrap().content, "external");
    }

    /// Store whose reads wait until released
    struct GatedStore {
        inner: FsStore,
        gate: tokio::sync::Notify,
        waiting: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl ContentStore for GatedStore {
        fn name(&self) -> &str {
            "gated"
        }

        async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, StoreError> {
            self.inner.list(dir).await
        }

        async fn get(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
            let file = self.inner.get(path).await;
            self.waiting.notify_one();
            self.gate.notified().await;
            file
        }

        async fn put(
            &self,
            path: &str,
            content: &str,
            version: Option<&str>,
            message: &str,
        ) -> Result<String, StoreError> {
            self.inner.put(path, content, version, message).await
        }

        async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError> {
            self.inner.delete(path, version, message).await
        }
    }

    #[tokio::test]
    async fn test_read_overlapping_write_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(GatedStore {
            inner: FsStore::new(temp.path()),
            gate: tokio::sync::Notify::new(),
            waiting: tokio::sync::Notify::new(),
        });
        let gw = Arc::new(ContentGateway::new(
            store.clone(),
            Arc::new(TtlCache::default()),
            DEFAULT_TIMEOUT,
        ));

        // A read observes the missing document, then stalls
        let reader = {
            let gw = Arc::clone(&gw);
            tokio::spawn(async move { gw.get(PATH).await })
        };
        store.waiting.notified().await;

        gw.put(PATH, "v1", None, "create").await.unwrap();
        store.gate.notify_one();
        assert!(reader.await.unwrap().is_none());

        // The stale miss was not cached
        let next = {
            let gw = Arc::clone(&gw);
            tokio::spawn(async move { gw.get(PATH).await })
        };
        tokio::time::timeout(Duration::from_secs(5), store.waiting.notified())
            .await
            .expect("second read should reach the store");
        store.gate.notify_one();
        assert_eq!(next.await.unwrap().unwrap().content, "v1");
    }

    #[tokio::test]
    async fn test_failed_write_propagates() {
        let temp = TempDir::new().unwrap();
        let gw = gateway(&temp, Arc::new(NoCache));

        gw.put(PATH, "v1", None, "create").await.unwrap();
        assert!(matches!(
            gw.put(PATH, "v2", Some("stale"), "update").await,
            Err(StoreError::Conflict { .. })
        ));
    }
}
