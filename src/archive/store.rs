//! Artifact storage
//!
//! The archive only needs two things from storage: create a blob under a new
//! name, and enumerate the names that exist.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Durable, write-once blob storage keyed by artifact name
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `payload` under `name`. Fails if `name` already exists.
    async fn put(&self, name: &str, payload: Bytes) -> io::Result<()>;

    /// Names of all stored artifacts, in discovery order
    async fn list_names(&self) -> io::Result<Vec<String>>;
}

/// Stores each artifact as a file in one directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage directory if it doesn't exist
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, name: &str, payload: Bytes) -> io::Result<()> {
        let path = self.root.join(name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&payload).await?;
        file.sync_all().await?;

        tracing::debug!("Wrote {} bytes to {:?}", payload.len(), path);
        Ok(())
    }

    async fn list_names(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_then_list() {
        let dir = tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.put("audio_alice_1.webm", Bytes::from_static(b"abc")).await.unwrap();
        store.put("audio_bob_2.webm", Bytes::from_static(b"def")).await.unwrap();

        let mut names = store.list_names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["audio_alice_1.webm", "audio_bob_2.webm"]);
        assert_eq!(
            std::fs::read(dir.path().join("audio_alice_1.webm")).unwrap(),
            b"abc"
        );
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let dir = tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        store.put("audio_alice_1.webm", Bytes::from_static(b"first")).await.unwrap();
        let err = store
            .put("audio_alice_1.webm", Bytes::from_static(b"second"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(
            std::fs::read(dir.path().join("audio_alice_1.webm")).unwrap(),
            b"first"
        );
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("audio_alice_1.webm"), b"x").unwrap();

        let store = FsArtifactStore::new(dir.path());
        assert_eq!(store.list_names().await.unwrap(), vec!["audio_alice_1.webm"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_fails() {
        let dir = tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().join("absent"));
        assert!(store.list_names().await.is_err());
    }
}
