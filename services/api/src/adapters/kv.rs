//! services/api/src/adapters/kv.rs
//!
//! This module contains the storage adapter, the concrete implementation of
//! the `KeyValueStore` port from the `core` crate. It plays the role browser
//! local storage plays for the web client: one small text file per key.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use study_vision_core::ports::{KeyValueStore, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `KeyValueStore` port on the local
/// filesystem. Writes are whole-value overwrites, matching the store's
/// full-collection re-save semantics.
#[derive(Clone)]
pub struct FileKvAdapter {
    dir: PathBuf,
}

impl FileKvAdapter {
    /// Creates a new `FileKvAdapter` rooted at the given data directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for FileKvAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to read storage key '{}': {}",
                key, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        ensure_dir(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("Failed to write storage key '{}': {}", key, e))
            })
    }
}

async fn ensure_dir(dir: &Path) -> PortResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        PortError::Unexpected(format!(
            "Failed to create data directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKvAdapter::new(dir.path());
        assert_eq!(kv.get("study-vision-sessions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_returns_the_stored_value() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKvAdapter::new(dir.path().join("nested"));
        kv.set("study-vision-theme", "dark").await.unwrap();
        assert_eq!(
            kv.get("study-vision-theme").await.unwrap(),
            Some("dark".to_string())
        );
    }

    #[tokio::test]
    async fn set_overwrites_the_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKvAdapter::new(dir.path());
        kv.set("study-vision-sessions", "[1]").await.unwrap();
        kv.set("study-vision-sessions", "[]").await.unwrap();
        assert_eq!(
            kv.get("study-vision-sessions").await.unwrap(),
            Some("[]".to_string())
        );
    }
}
