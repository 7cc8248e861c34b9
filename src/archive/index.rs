//! Recording index
//!
//! Lists archived artifacts by reading names back out of storage.

use super::naming::ArtifactName;
use super::store::ArtifactStore;
use super::RecordingEntry;
use crate::utils::AppResult;
use std::sync::Arc;

/// Read side of the archive
#[derive(Clone)]
pub struct RecordingIndex {
    store: Arc<dyn ArtifactStore>,
}

impl RecordingIndex {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// All recordings in discovery order.
    ///
    /// A failed enumeration fails the whole listing. Names that are not
    /// artifact names are skipped.
    pub async fn list(&self) -> AppResult<Vec<RecordingEntry>> {
        let names = self.store.list_names().await?;

        let entries = names
            .into_iter()
            .filter_map(|file_name| match ArtifactName::parse(&file_name) {
                Ok(name) => Some(RecordingEntry::from_name(file_name, &name)),
                Err(e) => {
                    tracing::warn!("Skipping unrecognized file in audio directory: {}", e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }
}
