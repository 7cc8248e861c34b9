//! Per-connection WebSocket loop
//!
//! A writer task drains the connection's outbox to the socket while the
//! reader loop feeds frames to the command handlers, one at a time, so a
//! holder's chunks reach the relay in the order they were sent. A connection
//! whose outbox overflows is closed like any other disconnect.

use crate::commands;
use crate::recorder::RoomCoordinator;
use crate::room::{outbox, ClientRequest, Identity, Outbound};
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::time::Duration;

/// How long the writer may take to flush after the room lets go of it
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Run an authenticated connection until the client goes away
pub async fn run_connection(socket: WebSocket, coordinator: RoomCoordinator, identity: Identity) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = outbox();
    let stalled = rx.stall_signal();
    let id = coordinator.connect(identity, tx);

    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let frame = match message {
                Outbound::Event(event) => match event.to_text() {
                    Ok(text) => Message::Text(text),
                    Err(e) => {
                        tracing::warn!("Failed to encode event for {}: {}", id, e);
                        continue;
                    }
                },
                Outbound::Audio(chunk) => Message::Binary(chunk.to_vec()),
            };

            if sink.send(frame).await.is_err() {
                break; // Client disconnected
            }
        }
        let _ = sink.close().await;
    });

    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = stalled.wait() => {
                tracing::warn!("Closing connection {} that is not keeping up", id);
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => match ClientRequest::from_text(&text) {
                Ok(request) => commands::dispatch(&coordinator, id, request),
                Err(e) => tracing::debug!("Ignoring malformed frame from {}: {}", id, e),
            },
            Some(Ok(Message::Binary(data))) => {
                commands::recording::submit_audio(&coordinator, id, Bytes::from(data));
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {} // Ping/pong are answered by axum
            Some(Err(e)) => {
                tracing::debug!("Socket error on {}: {}", id, e);
                break;
            }
        }
    }

    // Removing the peer drops its outbox, so the writer drains what is left,
    // closes the sink and exits.
    coordinator.disconnect(id);
    if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
        tracing::debug!("Writer for {} did not finish in time", id);
        writer.abort();
    }
}
