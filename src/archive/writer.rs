//! Archive writer
//!
//! Turns one audio submission into one immutable artifact.

use super::naming::ArtifactName;
use super::store::ArtifactStore;
use super::RecordingEntry;
use crate::room::Identity;
use crate::utils::{AppError, AppResult, Clock};
use bytes::Bytes;
use std::sync::Arc;

/// Writes submissions to an [`ArtifactStore`] under generated names
#[derive(Clone)]
pub struct ArchiveWriter {
    store: Arc<dyn ArtifactStore>,
    clock: Arc<dyn Clock>,
    extension: String,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ArtifactStore>, clock: Arc<dyn Clock>, extension: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            extension: extension.into(),
        }
    }

    /// Persist `payload` for `identity`, returning the entry describing the
    /// new artifact. Nothing is announced here; the caller decides.
    pub async fn archive(&self, identity: &Identity, payload: Bytes) -> AppResult<RecordingEntry> {
        let name = ArtifactName::new(identity.clone(), self.clock.now_millis(), &self.extension)?;
        let file_name = name.to_string();

        self.store.put(&file_name, payload).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                AppError::Archive(format!("{} already exists", file_name))
            } else {
                AppError::Io(e)
            }
        })?;

        tracing::info!("Audio file saved: {}", file_name);
        Ok(RecordingEntry::from_name(file_name, &name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::store::FsArtifactStore;
    use crate::utils::FixedClock;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_archive_names_artifact_from_identity_and_clock() {
        let dir = tempdir().unwrap();
        let writer = ArchiveWriter::new(
            Arc::new(FsArtifactStore::new(dir.path())),
            Arc::new(FixedClock(1_700_000_000_000)),
            "webm",
        );

        let entry = writer
            .archive(&Identity::new("alice"), Bytes::from_static(b"opus"))
            .await
            .unwrap();

        assert_eq!(entry.name, "audio_alice_1700000000000.webm");
        assert_eq!(entry.identity, Identity::new("alice"));
        assert_eq!(entry.epoch_millis, 1_700_000_000_000);
        assert_eq!(
            std::fs::read(dir.path().join("audio_alice_1700000000000.webm")).unwrap(),
            b"opus"
        );
    }

    #[tokio::test]
    async fn test_archive_rejects_unnameable_identity() {
        let dir = tempdir().unwrap();
        let writer = ArchiveWriter::new(
            Arc::new(FsArtifactStore::new(dir.path())),
            Arc::new(FixedClock(5)),
            "webm",
        );

        let err = writer
            .archive(&Identity::new("mary_jane"), Bytes::from_static(b"x"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ArtifactName(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_archive_same_millisecond_collides() {
        let dir = tempdir().unwrap();
        let writer = ArchiveWriter::new(
            Arc::new(FsArtifactStore::new(dir.path())),
            Arc::new(FixedClock(7)),
            "webm",
        );
        let alice = Identity::new("alice");

        writer.archive(&alice, Bytes::from_static(b"a")).await.unwrap();
        let err = writer.archive(&alice, Bytes::from_static(b"b")).await.unwrap_err();
        assert_eq!(err.code(), "ARCHIVE_ERROR");
        assert_eq!(
            err.to_string(),
            "Archive error: audio_alice_7.webm already exists"
        );
        assert_eq!(
            std::fs::read(dir.path().join("audio_alice_7.webm")).unwrap(),
            b"a"
        );
    }
}
