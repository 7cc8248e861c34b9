//! Session lookup
//!
//! Login and account storage live elsewhere. The room only needs to turn a
//! connection handshake into an identity, once, before admitting it.

pub mod handshake;

pub use handshake::Handshake;

use crate::room::Identity;
use crate::utils::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Resolves the identity behind a connection
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// `None` means the connection is not authenticated
    async fn resolve_identity(&self, handshake: &Handshake) -> Option<Identity>;
}

/// Fixed table of session token to username
#[derive(Debug, Clone, Default)]
pub struct StaticSessionDirectory {
    sessions: HashMap<String, Identity>,
}

impl StaticSessionDirectory {
    pub fn new(sessions: impl IntoIterator<Item = (String, Identity)>) -> Self {
        Self {
            sessions: sessions.into_iter().collect(),
        }
    }

    /// Load a JSON object of `{"<token>": "<username>"}`.
    ///
    /// A missing file gives an empty directory that refuses everyone.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "Session file {:?} not found; all connections will be refused",
                path
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let table: HashMap<String, String> = serde_json::from_str(&content)?;

        tracing::info!("Loaded {} sessions from {:?}", table.len(), path);
        Ok(Self::new(
            table.into_iter().map(|(token, name)| (token, Identity::new(name))),
        ))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionDirectory for StaticSessionDirectory {
    async fn resolve_identity(&self, handshake: &Handshake) -> Option<Identity> {
        let token = handshake.session_token()?;
        self.sessions.get(token).cloned()
    }
}
