//! Recorder lock state machine
//!
//! Defines who, if anyone, may currently broadcast into the room. The
//! arbiter only decides; delivering the resulting notices is the
//! coordinator's job.

use crate::room::ConnectionId;
use serde::Serialize;

/// Current state of the recorder lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RecorderState {
    /// Nobody is broadcasting
    Idle,
    /// `holder` owns the lock
    Recording { holder: ConnectionId },
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Outcome of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Granted,
    Denied,
}

impl StartOutcome {
    pub fn can_record(self) -> bool {
        matches!(self, StartOutcome::Granted)
    }
}

/// Exclusive-recorder arbiter
#[derive(Debug, Default)]
pub struct BroadcastArbiter {
    state: RecorderState,
}

impl BroadcastArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn holder(&self) -> Option<ConnectionId> {
        match self.state {
            RecorderState::Idle => None,
            RecorderState::Recording { holder } => Some(holder),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecorderState::Idle
    }

    pub fn is_held_by(&self, id: ConnectionId) -> bool {
        self.holder() == Some(id)
    }

    /// Grant the lock if nobody holds it.
    ///
    /// A repeated request from the current holder is denied like any other.
    pub fn request_start(&mut self, id: ConnectionId) -> StartOutcome {
        match self.state {
            RecorderState::Idle => {
                self.state = RecorderState::Recording { holder: id };
                StartOutcome::Granted
            }
            RecorderState::Recording { .. } => StartOutcome::Denied,
        }
    }

    /// Release the lock if `id` holds it. Returns whether a release happened.
    pub fn request_stop(&mut self, id: ConnectionId) -> bool {
        if self.is_held_by(id) {
            self.state = RecorderState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_start_wins() {
        let mut arbiter = BroadcastArbiter::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_eq!(arbiter.request_start(a), StartOutcome::Granted);
        assert_eq!(arbiter.request_start(b), StartOutcome::Denied);
        assert_eq!(arbiter.holder(), Some(a));
    }

    #[test]
    fn test_holder_restart_is_denied() {
        let mut arbiter = BroadcastArbiter::new();
        let a = ConnectionId::new();
        arbiter.request_start(a);

        assert_eq!(arbiter.request_start(a), StartOutcome::Denied);
        assert!(arbiter.is_held_by(a));
    }

    #[test]
    fn test_stop_from_non_holder_is_noop() {
        let mut arbiter = BroadcastArbiter::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        arbiter.request_start(a);

        assert!(!arbiter.request_stop(b));
        assert_eq!(arbiter.state(), RecorderState::Recording { holder: a });
    }

    #[test]
    fn test_stop_then_regrant() {
        let mut arbiter = BroadcastArbiter::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        arbiter.request_start(a);

        assert!(arbiter.request_stop(a));
        assert!(arbiter.is_idle());
        assert!(!arbiter.request_stop(a));
        assert_eq!(arbiter.request_start(b), StartOutcome::Granted);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_value(RecorderState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "idle" }));
    }
}
