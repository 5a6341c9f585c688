//! In-crate mocks shared by the unit tests.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use coop_domain::event::{Event, EventKind};

use crate::error::PublishError;
use crate::ports::{EventPublisher, Level, Pin, PinController, PinError, PinId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOp {
    Acquire(PinId),
    Write(PinId, Level),
    Release(PinId),
}

#[derive(Default)]
struct PinState {
    held: HashSet<PinId>,
    ops: Vec<PinOp>,
    fail_acquire: HashSet<PinId>,
    fail_write: HashSet<PinId>,
}

/// Pin controller that records every call.
#[derive(Default)]
pub struct RecordingPins {
    state: Mutex<PinState>,
}

impl RecordingPins {
    pub fn fail_acquire(&self, pin: PinId) {
        self.state.lock().unwrap().fail_acquire.insert(pin);
    }

    pub fn fail_write(&self, pin: PinId) {
        self.state.lock().unwrap().fail_write.insert(pin);
    }

    pub fn ops(&self) -> Vec<PinOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn writes(&self) -> Vec<(PinId, Level)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                PinOp::Write(pin, level) => Some((pin, level)),
                _ => None,
            })
            .collect()
    }

    pub fn held(&self) -> HashSet<PinId> {
        self.state.lock().unwrap().held.clone()
    }

    pub fn count_acquires(&self, pin: PinId) -> usize {
        self.ops()
            .iter()
            .filter(|op| **op == PinOp::Acquire(pin))
            .count()
    }
}

impl PinController for RecordingPins {
    fn acquire(&self, id: PinId) -> Result<Pin, PinError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_acquire.contains(&id) {
            return Err(PinError::Acquire {
                pin: id,
                source: "injected acquire failure".into(),
            });
        }
        if !state.held.insert(id) {
            return Err(PinError::Busy { pin: id });
        }
        state.ops.push(PinOp::Acquire(id));
        Ok(Pin::new(id))
    }

    fn write(&self, pin: &mut Pin, level: Level) -> Result<(), PinError> {
        let mut state = self.state.lock().unwrap();
        assert!(state.held.contains(&pin.id()), "write to unheld pin");
        if state.fail_write.contains(&pin.id()) {
            return Err(PinError::Write {
                pin: pin.id(),
                source: "injected write failure".into(),
            });
        }
        state.ops.push(PinOp::Write(pin.id(), level));
        Ok(())
    }

    fn release(&self, pin: Pin) {
        let mut state = self.state.lock().unwrap();
        state.held.remove(&pin.id());
        state.ops.push(PinOp::Release(pin.id()));
    }
}

/// Publisher that keeps every event.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<Event>>,
}

impl RecordingPublisher {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.kind.clone())
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), PublishError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
