//! Recording-related client commands

use crate::recorder::{RoomCoordinator, StartOutcome};
use crate::room::{ConnectionId, ServerEvent};
use bytes::Bytes;

/// Ask to become the recorder
pub fn start_recording(coordinator: &RoomCoordinator, id: ConnectionId) -> StartOutcome {
    coordinator.request_start(id)
}

/// Stop being the recorder
pub fn stop_recording(coordinator: &RoomCoordinator, id: ConnectionId) -> bool {
    coordinator.request_stop(id)
}

/// Relay and archive an audio chunk
pub fn submit_audio(coordinator: &RoomCoordinator, id: ConnectionId, payload: Bytes) -> bool {
    coordinator.submit_chunk(id, payload)
}

/// List archived recordings back to the requester.
///
/// Directory enumeration runs on its own task so it never holds up this
/// connection's audio frames.
pub fn get_recordings(coordinator: &RoomCoordinator, id: ConnectionId) {
    let coordinator = coordinator.clone();
    tokio::spawn(async move {
        let reply = match coordinator.list_recordings().await {
            Ok(recordings) => ServerEvent::RecordingsList { recordings },
            Err(e) => {
                tracing::error!("Error reading audio directory: {}", e);
                ServerEvent::RecordingsError {
                    message: e.to_string(),
                }
            }
        };
        coordinator.send_to(id, reply);
    });
}
