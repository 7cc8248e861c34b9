//! Stream relay
//!
//! Forwards the holder's audio chunks to every other connection. Runs under
//! the coordinator lock, so chunks from one holder leave in the order they
//! were submitted.

use super::messages::Outbound;
use super::presence::PresenceRegistry;
use super::types::{ConnectionId, Identity};
use crate::recorder::BroadcastArbiter;
use bytes::Bytes;

/// What happened to a submitted chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Forwarded to `listeners` peers; the caller should archive it under
    /// `identity`
    Forwarded { identity: Identity, listeners: usize },
    /// Sender does not hold the recorder lock
    Dropped,
}

/// Fan a chunk out to the room if `from` is the current holder
pub fn relay_chunk(
    presence: &PresenceRegistry,
    arbiter: &BroadcastArbiter,
    from: ConnectionId,
    payload: Bytes,
) -> RelayOutcome {
    if !arbiter.is_held_by(from) {
        return RelayOutcome::Dropped;
    }

    let Some(identity) = presence.identity(from).cloned() else {
        return RelayOutcome::Dropped;
    };

    presence.broadcast_except(from, Outbound::Audio(payload));
    RelayOutcome::Forwarded {
        identity,
        listeners: presence.len().saturating_sub(1),
    }
}
