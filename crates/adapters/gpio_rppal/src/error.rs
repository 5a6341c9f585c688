//! GPIO adapter error types.

use coop_app::ports::{PinError, PinId};

/// Errors specific to the rppal GPIO adapter.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The GPIO peripheral could not be opened.
    #[error("GPIO peripheral unavailable")]
    Unavailable(#[source] rppal::gpio::Error),

    /// The pin number does not fit a BCM GPIO number.
    #[error("pin {0} is not a valid BCM GPIO number")]
    InvalidPin(PinId),

    /// A write or release was attempted on a pin this driver does not hold.
    #[error("pin {0} is not held by this driver")]
    NotHeld(PinId),

    #[error(transparent)]
    Driver(#[from] rppal::gpio::Error),
}

impl GpioError {
    /// Wrap as an acquisition failure of `pin`.
    #[must_use]
    pub fn into_acquire(self, pin: PinId) -> PinError {
        PinError::Acquire {
            pin,
            source: Box::new(self),
        }
    }

    /// Wrap as a write failure of `pin`.
    #[must_use]
    pub fn into_write(self, pin: PinId) -> PinError {
        PinError::Write {
            pin,
            source: Box::new(self),
        }
    }
}
