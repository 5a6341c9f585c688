//! # coop-adapter-gpio-rppal
//!
//! [`PinController`] implementation on the Raspberry Pi GPIO peripheral,
//! through [`rppal`].
//!
//! ## Pin lifecycle
//!
//! | Step | rppal effect |
//! |------|--------------|
//! | acquire | `Gpio::get(n)?.into_output_low()` |
//! | write | `OutputPin::set_high` / `OutputPin::set_low` |
//! | release | drop the `OutputPin`, which restores the pin's previous mode |
//!
//! ## Dependency rule
//!
//! Depends on `coop-app` (port traits) only.

mod chip;
mod error;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use rppal::gpio::Gpio;

use coop_app::ports::{Level, Pin, PinController, PinError, PinId};

pub use chip::{Chip, OutputLine};
pub use error::GpioError;

/// GPIO driver backed by a [`Chip`], the Raspberry Pi peripheral by default.
///
/// Keeps the claimed output lines of this process. A second acquisition of
/// the same pin fails with [`PinError::Busy`] instead of reaching the chip.
pub struct RppalGpio<C: Chip = Gpio> {
    chip: C,
    held: Mutex<HashMap<PinId, C::Line>>,
}

impl RppalGpio {
    /// Open the GPIO peripheral.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Unavailable`] when the board is not supported or
    /// `/dev/gpiomem` cannot be opened.
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(GpioError::Unavailable)?;
        Ok(Self::with_chip(gpio))
    }
}

impl<C: Chip> RppalGpio<C> {
    #[must_use]
    pub fn with_chip(chip: C) -> Self {
        Self {
            chip,
            held: Mutex::new(HashMap::new()),
        }
    }

    /// Pins currently claimed through this driver.
    #[must_use]
    pub fn held(&self) -> Vec<PinId> {
        let mut pins: Vec<PinId> = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        pins.sort_unstable();
        pins
    }
}

fn bcm_number(id: PinId) -> Result<u8, GpioError> {
    u8::try_from(id.0).map_err(|_| GpioError::InvalidPin(id))
}

impl<C: Chip> PinController for RppalGpio<C> {
    fn acquire(&self, id: PinId) -> Result<Pin, PinError> {
        let number = bcm_number(id).map_err(|err| err.into_acquire(id))?;

        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if held.contains_key(&id) {
            return Err(PinError::Busy { pin: id });
        }
        let line = self.chip.output_low(number).map_err(|err| {
            tracing::warn!(%err, pin = %id, "failed to acquire pin");
            GpioError::from(err).into_acquire(id)
        })?;
        held.insert(id, line);

        tracing::debug!(pin = %id, "pin acquired");
        Ok(Pin::new(id))
    }

    fn write(&self, pin: &mut Pin, level: Level) -> Result<(), PinError> {
        let id = pin.id();
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(line) = held.get_mut(&id) else {
            return Err(GpioError::NotHeld(id).into_write(id));
        };
        match level {
            Level::High => line.set_high(),
            Level::Low => line.set_low(),
        }
        tracing::trace!(pin = %id, %level, "pin written");
        Ok(())
    }

    fn release(&self, pin: Pin) {
        let id = pin.id();
        let line = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match line {
            Some(line) => {
                drop(line);
                tracing::debug!(pin = %id, "pin released");
            }
            None => tracing::warn!(pin = %id, "released a pin this driver does not hold"),
        }
    }
}

impl<C: Chip> fmt::Debug for RppalGpio<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RppalGpio")
            .field("held", &self.held())
            .finish_non_exhaustive()
    }
}
