//! Recorder arbitration
//!
//! This module implements the single-broadcaster protocol:
//! - BroadcastArbiter, the exclusive recorder lock state machine
//! - RoomCoordinator, which serializes lock, presence, relay and archive
//!   dispatch behind one mutex

pub mod coordinator;
pub mod state;

pub use coordinator::{ReleaseReason, RoomCoordinator, RoomEvent, RoomSnapshot};
pub use state::{BroadcastArbiter, RecorderState, StartOutcome};
