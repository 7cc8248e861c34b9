//! Wire protocol
//!
//! Control messages travel as JSON text frames tagged by `type`; audio chunks
//! travel as raw binary frames and never pass through serde.

use super::types::Identity;
use crate::archive::RecordingEntry;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};
use tokio::sync::Notify;

/// Requests a client may send as text frames
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientRequest {
    /// Ask to become the room's recorder
    StartRecording,
    /// Give up the recorder role
    StopRecording,
    /// List archived recordings
    GetRecordings,
    /// List identities currently online
    GetOnlineUsers,
}

impl ClientRequest {
    /// Parse a text frame
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Notices the server sends as text frames
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    UserConnected {
        identity: Identity,
    },
    UserDisconnected {
        identity: Identity,
    },
    RecordingStatus {
        #[serde(rename = "canRecord")]
        can_record: bool,
    },
    NewAudio(RecordingEntry),
    RecordingsList {
        recordings: Vec<RecordingEntry>,
    },
    RecordingsError {
        message: String,
    },
    OnlineUsers {
        identities: Vec<Identity>,
    },
}

impl ServerEvent {
    pub fn recording_status(can_record: bool) -> Self {
        ServerEvent::RecordingStatus { can_record }
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Anything queued for delivery to one connection
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Event(ServerEvent),
    Audio(Bytes),
}

/// Messages a connection may have queued before it counts as stalled
pub const OUTBOX_CAPACITY: usize = 256;

/// Slots kept free for control events. Audio is shed for a listener once
/// fewer than this many remain.
pub const EVENT_HEADROOM: usize = 32;

/// Result of queueing one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Audio skipped because the listener is behind
    Shed,
    /// The writer task is gone
    Closed,
    /// A control event did not fit; the connection has been told to close
    Stalled,
}

/// Per-connection delivery queue, drained in order by the connection's
/// writer task. Bounded; never blocks the caller.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Outbound>,
    stalled: Arc<Notify>,
}

impl Outbox {
    /// Queue a message without waiting
    pub fn deliver(&self, message: Outbound) -> Delivery {
        if matches!(message, Outbound::Audio(_)) && self.tx.capacity() <= EVENT_HEADROOM {
            return Delivery::Shed;
        }

        match self.tx.try_send(message) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
            Err(TrySendError::Full(_)) => {
                self.stalled.notify_one();
                Delivery::Stalled
            }
        }
    }
}

/// Receiving half of an [`Outbox`]
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<Outbound>,
    stalled: Arc<Notify>,
}

impl Inbox {
    /// Next queued message; `None` once every outbox is dropped
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Outbound, TryRecvError> {
        self.rx.try_recv()
    }

    /// Handle that fires when a control event could not be queued
    pub fn stall_signal(&self) -> StallSignal {
        StallSignal(Arc::clone(&self.stalled))
    }
}

/// Fires once the connection's outbox overflowed on a control event
#[derive(Debug, Clone)]
pub struct StallSignal(Arc<Notify>);

impl StallSignal {
    pub async fn wait(&self) {
        self.0.notified().await;
    }
}

/// Create a connected outbox/inbox pair
pub fn outbox() -> (Outbox, Inbox) {
    let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
    let stalled = Arc::new(Notify::new());
    (
        Outbox {
            tx,
            stalled: Arc::clone(&stalled),
        },
        Inbox { rx, stalled },
    )
}
