//! Room coordinator
//!
//! Owns the presence registry and the recorder lock behind a single mutex.
//! Every state-changing operation takes the mutex once, applies its
//! transition and enqueues the resulting notices before releasing it, so
//! clients observe notices in transition order and nobody sees a holder that
//! is not present. Archive writes run on spawned tasks outside the mutex.

use super::state::{BroadcastArbiter, StartOutcome};
use crate::archive::{ArchiveWriter, RecordingEntry, RecordingIndex};
use crate::room::{
    relay_chunk, ConnectionId, Identity, Outbound, Outbox, PresenceRegistry, RelayOutcome,
    ServerEvent,
};
use crate::utils::AppResult;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Why the recorder lock was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    Stopped,
    Disconnected,
}

/// Events emitted by the room, in transition order
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Connection admitted
    Joined { id: ConnectionId, identity: Identity },
    /// Connection removed
    Left { id: ConnectionId, identity: Identity },
    /// Recorder lock granted
    RecorderGranted { holder: ConnectionId },
    /// Recorder lock released
    RecorderReleased { holder: ConnectionId, reason: ReleaseReason },
    /// Archive write finished and was announced
    ArtifactCreated(RecordingEntry),
    /// Archive write failed; nothing was announced
    ArchiveFailed { identity: Identity, error: String },
}

/// Read-only view of the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub online: Vec<Identity>,
    pub recording: bool,
}

struct RoomState {
    presence: PresenceRegistry,
    arbiter: BroadcastArbiter,
}

struct Inner {
    state: Mutex<RoomState>,
    writer: ArchiveWriter,
    index: RecordingIndex,
    event_tx: broadcast::Sender<RoomEvent>,
}

impl Inner {
    fn publish(&self, event: RoomEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

/// Serialized owner of all room state. Cheap to clone.
#[derive(Clone)]
pub struct RoomCoordinator {
    inner: Arc<Inner>,
}

impl RoomCoordinator {
    /// Create a coordinator with an idle recorder lock and nobody online
    pub fn new(writer: ArchiveWriter, index: RecordingIndex) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RoomState {
                    presence: PresenceRegistry::new(),
                    arbiter: BroadcastArbiter::new(),
                }),
                writer,
                index,
                event_tx,
            }),
        }
    }

    /// Subscribe to room events
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Admit an authenticated connection.
    ///
    /// Everyone else hears `userConnected`; the newcomer is told whether it
    /// may record right now.
    pub fn connect(&self, identity: Identity, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new();
        let mut state = self.inner.state.lock();

        state.presence.admit(id, identity.clone(), outbox);
        let can_record = state.arbiter.is_idle();
        state
            .presence
            .send_to(id, Outbound::Event(ServerEvent::recording_status(can_record)));

        tracing::info!("User connected: {} ({})", identity, id);
        self.inner.publish(RoomEvent::Joined { id, identity });
        id
    }

    /// Remove a connection, releasing the recorder lock if it held it.
    ///
    /// Returns `false` if the connection was never admitted.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.inner.state.lock();

        let Some(identity) = state.presence.remove(id) else {
            return false;
        };
        tracing::info!("User disconnected: {} ({})", identity, id);
        self.inner.publish(RoomEvent::Left {
            id,
            identity: identity.clone(),
        });

        if state.arbiter.request_stop(id) {
            state
                .presence
                .broadcast_all(Outbound::Event(ServerEvent::recording_status(true)));
            tracing::info!("Recorder {} disconnected, room is available", identity);
            self.inner.publish(RoomEvent::RecorderReleased {
                holder: id,
                reason: ReleaseReason::Disconnected,
            });
        }
        true
    }

    /// Ask for the recorder lock.
    ///
    /// Granted: the requester hears `canRecord: true` and everyone else
    /// `canRecord: false`. Denied: only the requester hears `canRecord:
    /// false`. Requests from unknown connections are denied silently.
    pub fn request_start(&self, id: ConnectionId) -> StartOutcome {
        let mut state = self.inner.state.lock();

        if !state.presence.contains(id) {
            tracing::debug!("Ignoring start request from unknown connection {}", id);
            return StartOutcome::Denied;
        }

        let outcome = state.arbiter.request_start(id);
        state.presence.send_to(
            id,
            Outbound::Event(ServerEvent::recording_status(outcome.can_record())),
        );

        if outcome == StartOutcome::Granted {
            state
                .presence
                .broadcast_except(id, Outbound::Event(ServerEvent::recording_status(false)));
            tracing::info!("Recording started by {}", id);
            self.inner.publish(RoomEvent::RecorderGranted { holder: id });
        } else {
            tracing::debug!("Recording denied for {}", id);
        }
        outcome
    }

    /// Give up the recorder lock. A no-op unless `id` holds it.
    pub fn request_stop(&self, id: ConnectionId) -> bool {
        let mut state = self.inner.state.lock();

        if !state.arbiter.request_stop(id) {
            return false;
        }

        state
            .presence
            .broadcast_except(id, Outbound::Event(ServerEvent::recording_status(true)));
        tracing::info!("Recording stopped by {}", id);
        self.inner.publish(RoomEvent::RecorderReleased {
            holder: id,
            reason: ReleaseReason::Stopped,
        });
        true
    }

    /// Relay a chunk from the holder and archive it in the background.
    ///
    /// Returns whether the chunk was accepted. Chunks from anyone but the
    /// holder are dropped without a reply.
    pub fn submit_chunk(&self, id: ConnectionId, payload: Bytes) -> bool {
        let outcome = {
            let state = self.inner.state.lock();
            relay_chunk(&state.presence, &state.arbiter, id, payload.clone())
        };

        match outcome {
            RelayOutcome::Forwarded { identity, listeners } => {
                tracing::debug!(
                    "Audio data received from {} ({} bytes, {} listeners)",
                    identity,
                    payload.len(),
                    listeners
                );
                self.spawn_archive(identity, payload);
                true
            }
            RelayOutcome::Dropped => {
                tracing::debug!("Dropping audio chunk from non-recorder {}", id);
                false
            }
        }
    }

    fn spawn_archive(&self, identity: Identity, payload: Bytes) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.writer.archive(&identity, payload).await {
                Ok(entry) => {
                    let state = inner.state.lock();
                    state
                        .presence
                        .broadcast_all(Outbound::Event(ServerEvent::NewAudio(entry.clone())));
                    inner.publish(RoomEvent::ArtifactCreated(entry));
                }
                Err(e) => {
                    tracing::error!("Error writing audio file for {}: {}", identity, e);
                    inner.publish(RoomEvent::ArchiveFailed {
                        identity,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    /// List archived recordings
    pub async fn list_recordings(&self) -> AppResult<Vec<RecordingEntry>> {
        self.inner.index.list().await
    }

    /// Queue a notice for one connection
    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        self.inner.state.lock().presence.send_to(id, Outbound::Event(event));
    }

    /// Identities online, one per connection
    pub fn online(&self) -> Vec<Identity> {
        self.inner.state.lock().presence.online()
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.inner.state.lock().presence.contains(id)
    }

    /// Current lock holder, if any
    pub fn holder(&self) -> Option<ConnectionId> {
        self.inner.state.lock().arbiter.holder()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let state = self.inner.state.lock();
        RoomSnapshot {
            online: state.presence.online(),
            recording: !state.arbiter.is_idle(),
        }
    }
}
