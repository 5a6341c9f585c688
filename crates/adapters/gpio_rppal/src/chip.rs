//! The slice of the GPIO peripheral the driver needs.
//!
//! [`rppal::gpio::Gpio`] is the real chip. Keeping the driver generic over
//! [`Chip`] lets the pin bookkeeping run without a Raspberry Pi.

use rppal::gpio::{Gpio, OutputPin};

/// Hands out output lines.
pub trait Chip {
    type Line: OutputLine;

    /// Claim BCM pin `number` and configure it as an output driven low.
    ///
    /// # Errors
    ///
    /// Returns the driver error when the pin does not exist or is already
    /// claimed through another handle.
    fn output_low(&self, number: u8) -> Result<Self::Line, rppal::gpio::Error>;
}

/// A claimed output line. Dropping it gives the pin back.
pub trait OutputLine {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

impl Chip for Gpio {
    type Line = OutputPin;

    fn output_low(&self, number: u8) -> Result<OutputPin, rppal::gpio::Error> {
        Ok(self.get(number)?.into_output_low())
    }
}

impl OutputLine for OutputPin {
    fn set_high(&mut self) {
        OutputPin::set_high(self);
    }

    fn set_low(&mut self) {
        OutputPin::set_low(self);
    }
}
