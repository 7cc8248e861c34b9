//! Room membership and real-time delivery
//!
//! - Identity and connection id types
//! - Presence registry (who is online, fan-out of notices)
//! - Stream relay for the holder's audio
//! - Wire protocol messages

pub mod messages;
pub mod presence;
pub mod relay;
pub mod types;

pub use messages::{
    outbox, ClientRequest, Delivery, Inbox, Outbound, Outbox, ServerEvent, StallSignal,
    EVENT_HEADROOM, OUTBOX_CAPACITY,
};
pub use presence::PresenceRegistry;
pub use relay::{relay_chunk, RelayOutcome};
pub use types::{ConnectionId, Identity};
