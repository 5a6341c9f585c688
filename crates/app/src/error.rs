//! Errors surfaced by the application layer.

use std::error::Error as StdError;
use std::fmt::Write as _;

use coop_domain::status::DoorStatus;

use crate::door::DoorError;
use crate::ports::pins::PinError;

/// Failure of a controller operation.
#[derive(Debug, thiserror::Error)]
pub enum CoopError {
    /// Another actuation is in flight; nothing was changed.
    #[error("an actuation is already in flight")]
    ConcurrencyConflict,

    /// A pin could not be acquired or driven.
    #[error("hardware fault")]
    HardwareFault(#[source] PinError),

    /// The actuation was stopped before its duration elapsed.
    #[error("actuation interrupted")]
    Interrupted,

    /// Only `open` and `closed` may be recorded manually.
    #[error("status {0} cannot be set manually")]
    InvalidOverride(DoorStatus),
}

impl From<PinError> for CoopError {
    fn from(err: PinError) -> Self {
        Self::HardwareFault(err)
    }
}

impl From<DoorError> for CoopError {
    fn from(err: DoorError) -> Self {
        match err {
            DoorError::Hardware(err) => Self::HardwareFault(err),
            DoorError::Interrupted => Self::Interrupted,
        }
    }
}

/// The event publisher could not deliver an event.
#[derive(Debug, thiserror::Error)]
#[error("failed to publish event: {reason}")]
pub struct PublishError {
    pub reason: String,
}

/// Render an error and its `source()` chain on one line, `outer: inner`.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}
