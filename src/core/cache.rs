//! Advisory cache for storage reads.
//!
//! The cache is a disposable projection of the store: it may be cleared at
//! any time and every operation must behave the same with [`NoCache`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::adapters::StoredFile;

/// Default time-to-live for cached reads (5 min)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A memoized storage read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedRead {
    /// Directory listing (`None` when the directory did not exist)
    Listing(Option<Vec<String>>),

    /// Single document (`None` when it did not exist)
    File(Option<StoredFile>),
}

/// Cache key for a directory listing
pub fn listing_key(dir: &str) -> String {
    format!("list:{}", dir)
}

/// Cache key for a document read
pub fn file_key(path: &str) -> String {
    format!("get:{}", path)
}

/// Injectable read cache
pub trait ReadCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedRead>;

    fn set(&self, key: &str, value: CachedRead);

    fn invalidate(&self, key: &str);

    fn clear(&self);
}

/// Cache that never stores anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ReadCache for NoCache {
    fn get(&self, _key: &str) -> Option<CachedRead> {
        None
    }

    fn set(&self, _key: &str, _value: CachedRead) {}

    fn invalidate(&self, _key: &str) {}

    fn clear(&self) {}
}

/// In-memory cache with a flat per-entry expiry
#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, CachedRead)>>,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadCache for TtlCache {
    fn get(&self, key: &str) -> Option<CachedRead> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
                    return Some(value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired
        self.invalidate(key);
        None
    }

    fn set(&self, key: &str, value: CachedRead) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (Instant::now(), value));
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
