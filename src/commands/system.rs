//! Presence-related client commands

use crate::recorder::RoomCoordinator;
use crate::room::{ConnectionId, ServerEvent};

/// Tell the requester who is online
pub fn get_online_users(coordinator: &RoomCoordinator, id: ConnectionId) {
    let identities = coordinator.online();
    coordinator.send_to(id, ServerEvent::OnlineUsers { identities });
}
