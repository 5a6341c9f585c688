//! Pin controller port — exclusive access to digital output pins.
//!
//! The door motor is driven through three pins (two direction pins and an
//! enable pin). Adapters provide the real driver (Raspberry Pi GPIO) or a
//! simulated one.

use std::fmt;

/// Hardware pin number as understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u32);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::High => f.write_str("high"),
        }
    }
}

/// Handle to an acquired pin.
///
/// Only a [`PinController`] creates handles; giving one back through
/// [`PinController::release`] ends the exclusive access.
#[derive(Debug, PartialEq, Eq)]
pub struct Pin {
    id: PinId,
}

impl Pin {
    /// Create a handle. Intended for [`PinController`] implementations.
    #[must_use]
    pub fn new(id: PinId) -> Self {
        Self { id }
    }

    #[must_use]
    pub fn id(&self) -> PinId {
        self.id
    }
}

/// Boxed driver error carried by [`PinError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pin access failure.
#[derive(Debug, thiserror::Error)]
pub enum PinError {
    /// The pin is already held.
    #[error("pin {pin} is already in use")]
    Busy { pin: PinId },

    #[error("failed to acquire pin {pin}")]
    Acquire {
        pin: PinId,
        #[source]
        source: BoxError,
    },

    #[error("failed to drive pin {pin}")]
    Write {
        pin: PinId,
        #[source]
        source: BoxError,
    },
}

impl PinError {
    /// The pin the failure relates to.
    #[must_use]
    pub fn pin(&self) -> PinId {
        match self {
            Self::Busy { pin } | Self::Acquire { pin, .. } | Self::Write { pin, .. } => *pin,
        }
    }
}

/// Exclusive access to output pins.
///
/// Calls are synchronous: a pin write is a single small syscall, and the
/// timed part of an actuation lives in the door, not in the driver.
pub trait PinController {
    /// Take exclusive control of `id` and configure it as an output at
    /// [`Level::Low`].
    ///
    /// # Errors
    ///
    /// Returns [`PinError::Busy`] if the pin is already held, or
    /// [`PinError::Acquire`] if the driver fails.
    fn acquire(&self, id: PinId) -> Result<Pin, PinError>;

    /// Drive an acquired pin.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::Write`] if the driver fails.
    fn write(&self, pin: &mut Pin, level: Level) -> Result<(), PinError>;

    /// Give the pin back. Never fails; driver problems are logged.
    fn release(&self, pin: Pin);
}

impl<T: PinController + ?Sized> PinController for std::sync::Arc<T> {
    fn acquire(&self, id: PinId) -> Result<Pin, PinError> {
        (**self).acquire(id)
    }

    fn write(&self, pin: &mut Pin, level: Level) -> Result<(), PinError> {
        (**self).write(pin, level)
    }

    fn release(&self, pin: Pin) {
        (**self).release(pin);
    }
}
