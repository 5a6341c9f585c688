//! # coop-adapter-virtual
//!
//! Simulated pin driver for dry runs and tests.
//!
//! [`VirtualPins`] keeps the level of every pin in memory, records each write,
//! tracks which pins are held and counts acquisitions of a pin that was
//! already held. Faults can be injected per pin to exercise the controller's
//! error paths without hardware.
//!
//! ## Dependency rule
//!
//! Depends on `coop-app` (port traits) only.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use coop_app::ports::pins::BoxError;
use coop_app::ports::{Level, Pin, PinController, PinError, PinId};

/// Error returned by injected faults.
#[derive(Debug)]
struct InjectedFault(&'static str);

impl std::fmt::Display for InjectedFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "injected {} fault", self.0)
    }
}

impl std::error::Error for InjectedFault {}

#[derive(Debug, Default)]
struct State {
    levels: HashMap<PinId, Level>,
    history: Vec<(PinId, Level)>,
    held: HashSet<PinId>,
    overlaps: usize,
    acquisitions: usize,
    fail_acquire: HashSet<PinId>,
    fail_write: HashSet<PinId>,
}

/// In-memory [`PinController`].
#[derive(Debug, Default)]
pub struct VirtualPins {
    state: Mutex<State>,
}

impl VirtualPins {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last level written to `pin`, `None` if never driven.
    #[must_use]
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.lock().levels.get(&pin).copied()
    }

    /// Every write in order.
    #[must_use]
    pub fn history(&self) -> Vec<(PinId, Level)> {
        self.lock().history.clone()
    }

    /// Pins currently held.
    #[must_use]
    pub fn held(&self) -> HashSet<PinId> {
        self.lock().held.clone()
    }

    /// Acquisitions refused because the pin was already held.
    #[must_use]
    pub fn overlaps(&self) -> usize {
        self.lock().overlaps
    }

    /// Successful acquisitions so far.
    #[must_use]
    pub fn acquisitions(&self) -> usize {
        self.lock().acquisitions
    }

    /// Make every later acquisition of `pin` fail.
    pub fn fail_acquire(&self, pin: PinId) {
        self.lock().fail_acquire.insert(pin);
    }

    /// Make every later write to `pin` fail.
    pub fn fail_write(&self, pin: PinId) {
        self.lock().fail_write.insert(pin);
    }

    /// Remove all injected faults.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.fail_acquire.clear();
        state.fail_write.clear();
    }
}

impl PinController for VirtualPins {
    fn acquire(&self, id: PinId) -> Result<Pin, PinError> {
        let mut state = self.lock();
        if state.fail_acquire.contains(&id) {
            return Err(PinError::Acquire {
                pin: id,
                source: BoxError::from(InjectedFault("acquire")),
            });
        }
        if !state.held.insert(id) {
            state.overlaps += 1;
            tracing::warn!(pin = %id, "virtual pin acquired while already held");
            return Err(PinError::Busy { pin: id });
        }
        state.acquisitions += 1;
        state.levels.insert(id, Level::Low);
        tracing::debug!(pin = %id, "virtual pin acquired");
        Ok(Pin::new(id))
    }

    fn write(&self, pin: &mut Pin, level: Level) -> Result<(), PinError> {
        let id = pin.id();
        let mut state = self.lock();
        if state.fail_write.contains(&id) {
            return Err(PinError::Write {
                pin: id,
                source: BoxError::from(InjectedFault("write")),
            });
        }
        state.levels.insert(id, level);
        state.history.push((id, level));
        tracing::trace!(pin = %id, %level, "virtual pin written");
        Ok(())
    }

    fn release(&self, pin: Pin) {
        let id = pin.id();
        if !self.lock().held.remove(&id) {
            tracing::warn!(pin = %id, "released a virtual pin that was not held");
        }
    }
}
