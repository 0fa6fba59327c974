//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use topicbase::adapters::{ContentStore, FsStore, StoreError, StoredFile};
use topicbase::core::{ContentGateway, NoCache, ReadCache, TopicRepository, TtlCache};
use topicbase::TopicDraft;

pub const CONTENT_ROOT: &str = "content";

/// Store wrapper that counts every call reaching the backend
pub struct CountingStore {
    inner: Arc<dyn ContentStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn ContentStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, StoreError> {
        self.hit();
        self.inner.list(dir).await
    }

    async fn get(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        self.hit();
        self.inner.get(path).await
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        version: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError> {
        self.hit();
        self.inner.put(path, content, version, message).await
    }

    async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete(path, version, message).await
    }
}

/// A repository over a temporary directory, with its backing store
pub struct Fixture {
    pub temp: TempDir,
    pub store: Arc<CountingStore>,
    pub repo: TopicRepository,
}

impl Fixture {
    pub fn new(cached: bool) -> Self {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(CountingStore::new(Arc::new(FsStore::new(temp.path()))));
        let cache: Arc<dyn ReadCache> = if cached {
            Arc::new(TtlCache::new(Duration::from_secs(60)))
        } else {
            Arc::new(NoCache)
        };
        let gateway = ContentGateway::new(store.clone(), cache, Duration::from_secs(5));

        Self {
            temp,
            store,
            repo: TopicRepository::new(gateway, CONTENT_ROOT),
        }
    }

    /// Write a raw document under the content root, bypassing the repository
    pub fn write_raw(&self, relative: &str, content: &str) {
        let path = self.temp.path().join(CONTENT_ROOT).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

pub fn draft(number: i64, title: &str, section: &str) -> TopicDraft {
    TopicDraft {
        topic_number: number,
        title: title.to_string(),
        section: section.to_string(),
        ..Default::default()
    }
}
