//! Event — an immutable record of something the controller did.
//!
//! Events are produced when the door status changes, when an actuation fails
//! or is rejected, and when a running actuation is stopped.

use serde::{Deserialize, Serialize};

use crate::status::{Command, DoorStatus};
use crate::time::{Timestamp, now};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The recorded door status moved from one value to another.
    StatusChanged { from: DoorStatus, to: DoorStatus },
    /// An actuation hit a hardware fault.
    ActuationFailed { command: Command, reason: String },
    /// An actuation was refused because another one was in flight.
    ActuationRejected { command: Command },
    /// A running actuation was interrupted and the motor de-energised.
    Stopped,
}

/// A timestamped [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: now(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StatusChanged { from, to } => write!(f, "status_changed({from} -> {to})"),
            Self::ActuationFailed { command, reason } => {
                write!(f, "actuation_failed({command}: {reason})")
            }
            Self::ActuationRejected { command } => write!(f, "actuation_rejected({command})"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}
