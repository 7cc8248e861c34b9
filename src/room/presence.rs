//! Presence registry
//!
//! Tracks admitted connections and owns their outboxes, so it is also the
//! fan-out point for every notice the room sends.

use super::messages::{Delivery, Outbound, Outbox, ServerEvent};
use super::types::{ConnectionId, Identity};

/// One admitted connection
#[derive(Debug)]
struct Peer {
    id: ConnectionId,
    identity: Identity,
    outbox: Outbox,
}

impl Peer {
    fn deliver(&self, message: Outbound) {
        // Closed and stalled peers are removed by their socket loop's
        // disconnect shortly after.
        match self.outbox.deliver(message) {
            Delivery::Queued => {}
            Delivery::Shed => {
                tracing::debug!("Listener {} is behind, skipping audio chunk", self.id);
            }
            Delivery::Closed => {
                tracing::debug!("Dropping message for closed connection {}", self.id);
            }
            Delivery::Stalled => {
                tracing::warn!("Connection {} stopped reading, closing it", self.id);
            }
        }
    }
}

/// Connections currently online, in admission order
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    peers: Vec<Peer>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and announce it to everyone else.
    ///
    /// Returns `false` without side effects if the connection was already
    /// admitted.
    pub fn admit(&mut self, id: ConnectionId, identity: Identity, outbox: Outbox) -> bool {
        if self.contains(id) {
            return false;
        }

        self.broadcast_except(
            id,
            Outbound::Event(ServerEvent::UserConnected {
                identity: identity.clone(),
            }),
        );
        self.peers.push(Peer {
            id,
            identity,
            outbox,
        });
        true
    }

    /// Unregister a connection and announce its departure to the rest.
    ///
    /// Returns the identity it was admitted under, or `None` if it never was.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Identity> {
        let index = self.peers.iter().position(|p| p.id == id)?;
        let peer = self.peers.remove(index);

        self.broadcast_all(Outbound::Event(ServerEvent::UserDisconnected {
            identity: peer.identity.clone(),
        }));
        Some(peer.identity)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.peers.iter().any(|p| p.id == id)
    }

    pub fn identity(&self, id: ConnectionId) -> Option<&Identity> {
        self.peers.iter().find(|p| p.id == id).map(|p| &p.identity)
    }

    /// Identities online, one entry per connection
    pub fn online(&self) -> Vec<Identity> {
        self.peers.iter().map(|p| p.identity.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Queue a message for a single connection
    pub fn send_to(&self, id: ConnectionId, message: Outbound) {
        if let Some(peer) = self.peers.iter().find(|p| p.id == id) {
            peer.deliver(message);
        }
    }

    /// Queue a message for every connection except `id`
    pub fn broadcast_except(&self, id: ConnectionId, message: Outbound) {
        for peer in self.peers.iter().filter(|p| p.id != id) {
            peer.deliver(message.clone());
        }
    }

    /// Queue a message for every connection
    pub fn broadcast_all(&self, message: Outbound) {
        for peer in &self.peers {
            peer.deliver(message.clone());
        }
    }
}
