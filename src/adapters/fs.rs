//! Local filesystem backend.
//!
//! Documents live under a root directory using the same logical paths as
//! the remote store. The version token is the SHA-256 of the file bytes, so
//! the compare-and-swap rules match the remote backend.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;

use super::{ContentStore, StoreError, StoredFile};

/// Filesystem-backed content store
pub struct FsStore {
    root: PathBuf,
    /// Serializes check-then-write sequences within this process
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical path onto the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn read_current(&self, file: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Version token for a document's bytes
pub fn content_version(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[async_trait]
impl ContentStore for FsStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, StoreError> {
        let dir_path = self.resolve(dir)?;

        let mut entries = match fs::read_dir(&dir_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(Some(names))
    }

    async fn get(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let file = self.resolve(path)?;

        let Some(bytes) = self.read_current(&file).await? else {
            return Ok(None);
        };
        let version = content_version(&bytes);
        let content = String::from_utf8(bytes)
            .map_err(|e| StoreError::Decode(format!("{}: {}", path, e)))?;

        Ok(Some(StoredFile {
            path: path.to_string(),
            content,
            version,
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        version: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let current = self.read_current(&file).await?;
        let matches = match (version, &current) {
            (Some(expected), Some(bytes)) => content_version(bytes) == expected,
            (None, None) => true,
            _ => false,
        };
        if !matches {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file, content).await?;
        tracing::debug!(path, commit_message = message, "Wrote document");

        Ok(content_version(content.as_bytes()))
    }

    async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let Some(current) = self.read_current(&file).await? else {
            return Err(StoreError::NotFound(path.to_string()));
        };
        if content_version(&current) != version {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        fs::remove_file(&file).await?;
        tracing::debug!(path, commit_message = message, "Deleted document");

        Ok(())
    }
}
