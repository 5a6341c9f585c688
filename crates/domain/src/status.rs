//! Logical door status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The controller's belief about the door's physical state.
///
/// The door has no position sensor: `Open` and `Closed` only mean that the
/// last actuation in that direction completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorStatus {
    /// Position not known (startup, or after an interrupted actuation).
    #[default]
    Unknown,
    Open,
    Closed,
    /// An opening actuation is in flight.
    Opening,
    /// A closing actuation is in flight.
    Closing,
    /// The last actuation failed on a hardware fault.
    Error,
}

impl DoorStatus {
    /// Stable lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Closing => "closing",
            Self::Error => "error",
        }
    }

    /// Whether this status describes a resting door position.
    ///
    /// Only settled statuses may be recorded by a manual override.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }

    /// Whether an actuation is running.
    #[must_use]
    pub fn is_moving(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// A door actuation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Open,
    Close,
}

impl Command {
    /// Status recorded once this command completes.
    #[must_use]
    pub fn target(self) -> DoorStatus {
        match self {
            Self::Open => DoorStatus::Open,
            Self::Close => DoorStatus::Closed,
        }
    }

    /// Status reported while this command is in flight.
    #[must_use]
    pub fn in_flight(self) -> DoorStatus {
        match self {
            Self::Open => DoorStatus::Opening,
            Self::Close => DoorStatus::Closing,
        }
    }

    /// Command that drives the door towards a settled `status`.
    #[must_use]
    pub fn towards(status: DoorStatus) -> Option<Self> {
        match status {
            DoorStatus::Open => Some(Self::Open),
            DoorStatus::Closed => Some(Self::Close),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Close => f.write_str("close"),
        }
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "opening" => Ok(Self::Opening),
            "closing" => Ok(Self::Closing),
            "error" => Ok(Self::Error),
            other => Err(ParseError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}
