//! Audio archive
//!
//! Every chunk the recorder sends is also written to disk as its own
//! artifact. This module holds:
//! - the artifact naming grammar
//! - the storage seam and its filesystem implementation
//! - the writer (one submission, one artifact)
//! - the index (list what was written)

pub mod index;
pub mod naming;
pub mod store;
pub mod writer;

pub use index::RecordingIndex;
pub use naming::{validate_extension, ArtifactName, NameError, DEFAULT_EXTENSION};
pub use store::{ArtifactStore, FsArtifactStore};
pub use writer::ArchiveWriter;

use crate::room::Identity;
use serde::{Deserialize, Serialize};

/// One archived recording as clients see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingEntry {
    /// Stored file name, also the download key
    pub name: String,

    /// Who recorded it
    pub identity: Identity,

    /// Local creation time for display
    pub timestamp: String,

    /// Creation time as Unix milliseconds
    pub epoch_millis: i64,
}

impl RecordingEntry {
    pub(crate) fn from_name(file_name: String, name: &ArtifactName) -> Self {
        Self {
            name: file_name,
            identity: name.identity().clone(),
            timestamp: name.display_timestamp(),
            epoch_millis: name.epoch_millis(),
        }
    }
}
