//! Client command handlers
//!
//! Everything a connected client can ask of the room, routed from the
//! socket loop.

pub mod recording;
pub mod system;

use crate::recorder::RoomCoordinator;
use crate::room::{ClientRequest, ConnectionId};

/// Route one parsed text request
pub fn dispatch(coordinator: &RoomCoordinator, id: ConnectionId, request: ClientRequest) {
    match request {
        ClientRequest::StartRecording => {
            recording::start_recording(coordinator, id);
        }
        ClientRequest::StopRecording => {
            recording::stop_recording(coordinator, id);
        }
        ClientRequest::GetRecordings => recording::get_recordings(coordinator, id),
        ClientRequest::GetOnlineUsers => system::get_online_users(coordinator, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveWriter, ArtifactStore, FsArtifactStore, RecordingIndex};
    use crate::room::{outbox, Identity, Outbound, ServerEvent};
    use crate::utils::SystemClock;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn room_at(path: &std::path::Path) -> RoomCoordinator {
        let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(path));
        RoomCoordinator::new(
            ArchiveWriter::new(store.clone(), Arc::new(SystemClock), "webm"),
            RecordingIndex::new(store),
        )
    }

    #[tokio::test]
    async fn test_get_recordings_replies_to_requester() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("audio_bob_1700000000000.webm"), b"x").unwrap();
        let room = room_at(dir.path());
        let (tx, mut rx) = outbox();
        let id = room.connect(Identity::new("alice"), tx);
        rx.recv().await.unwrap();

        dispatch(&room, id, ClientRequest::GetRecordings);

        let reply = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match reply {
            Outbound::Event(ServerEvent::RecordingsList { recordings }) => {
                assert_eq!(recordings.len(), 1);
                assert_eq!(recordings[0].identity, Identity::new("bob"));
            }
            other => panic!("expected recordingsList, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_recordings_reports_failure() {
        let dir = tempdir().unwrap();
        let room = room_at(&dir.path().join("missing"));
        let (tx, mut rx) = outbox();
        let id = room.connect(Identity::new("alice"), tx);
        rx.recv().await.unwrap();

        dispatch(&room, id, ClientRequest::GetRecordings);

        let reply = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            reply,
            Outbound::Event(ServerEvent::RecordingsError { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_online_users() {
        let dir = tempdir().unwrap();
        let room = room_at(dir.path());
        let (a_tx, mut a_rx) = outbox();
        let (b_tx, _b_rx) = outbox();
        let a = room.connect(Identity::new("alice"), a_tx);
        room.connect(Identity::new("bob"), b_tx);
        while a_rx.try_recv().is_ok() {}

        dispatch(&room, a, ClientRequest::GetOnlineUsers);

        assert_eq!(
            a_rx.try_recv().unwrap(),
            Outbound::Event(ServerEvent::OnlineUsers {
                identities: vec![Identity::new("alice"), Identity::new("bob")]
            })
        );
    }
}
