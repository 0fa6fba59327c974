//! Storage backends for topic documents.
//!
//! Every backend exposes the same small capability set over logical paths
//! (`list`, `get`, `put`, `delete`) with content-version tokens used as
//! optimistic-concurrency preconditions. The backend is picked from
//! configuration; nothing above this layer knows which one is in use.

pub mod fs;
pub mod github;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use fs::FsStore;
pub use github::{GithubConfig, GithubStore};

/// A document read from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Logical path of the document
    pub path: String,

    /// Decoded text content
    pub content: String,

    /// Content-version token, required to overwrite or delete
    pub version: String,
}

/// Failures reported by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Version conflict on {path}: the stored document changed")]
    Conflict { path: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not decode stored content: {0}")]
    Decode(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Trait for document storage backends
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// File names directly under `dir`; `None` when the directory is missing
    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Read a document; `None` when it does not exist
    async fn get(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Create or overwrite a document, returning its new version token.
    ///
    /// With `version` set, the write only succeeds if the stored document
    /// still has that version. Without it, the document must not exist yet.
    async fn put(
        &self,
        path: &str,
        content: &str,
        version: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError>;

    /// Delete a document whose current version is `version`
    async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError>;
}
