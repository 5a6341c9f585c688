//! Door actuator — open-loop, timed motor control over three pins.
//!
//! The motor is wired to an H-bridge: two direction pins select the rotation
//! and the enable pin powers the motor. An actuation sets the direction,
//! energises the motor for a fixed duration and de-energises it. There is no
//! position feedback; the door never knows whether it is open or closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use coop_domain::status::Command;

use crate::ports::{Level, Pin, PinController, PinError, PinId};

/// Failure of a door operation.
#[derive(Debug, thiserror::Error)]
pub enum DoorError {
    #[error(transparent)]
    Hardware(#[from] PinError),

    /// [`Door::interrupt`] ended the wait early.
    #[error("actuation interrupted")]
    Interrupted,
}

/// A zero opening or closing duration was configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("door {which} duration must be positive")]
pub struct InvalidTiming {
    pub which: &'static str,
}

/// Pin wiring of the motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorPins {
    pub direction_a: PinId,
    pub direction_b: PinId,
    pub enable: PinId,
}

impl DoorPins {
    fn in_order(self) -> [PinId; 3] {
        [self.direction_a, self.direction_b, self.enable]
    }
}

/// How long the motor runs in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorTiming {
    opening: Duration,
    closing: Duration,
}

impl DoorTiming {
    /// # Errors
    ///
    /// Returns [`InvalidTiming`] if either duration is zero.
    pub fn new(opening: Duration, closing: Duration) -> Result<Self, InvalidTiming> {
        if opening.is_zero() {
            return Err(InvalidTiming { which: "opening" });
        }
        if closing.is_zero() {
            return Err(InvalidTiming { which: "closing" });
        }
        Ok(Self { opening, closing })
    }

    #[must_use]
    pub fn opening(&self) -> Duration {
        self.opening
    }

    #[must_use]
    pub fn closing(&self) -> Duration {
        self.closing
    }
}

const DIRECTION_A: usize = 0;
const DIRECTION_B: usize = 1;
const ENABLE: usize = 2;

/// Pins held for the duration of one operation.
///
/// Dropping the guard drives every held pin low and releases it, so partial
/// acquisitions, early returns and cancelled futures never leave the motor
/// energised or a pin held.
struct PinGuard<'a, P: PinController> {
    controller: &'a P,
    held: Vec<Pin>,
}

impl<'a, P: PinController> PinGuard<'a, P> {
    fn acquire(controller: &'a P, pins: DoorPins) -> Result<Self, PinError> {
        let mut guard = Self {
            controller,
            held: Vec::with_capacity(3),
        };
        for id in pins.in_order() {
            let pin = controller.acquire(id)?;
            guard.held.push(pin);
        }
        Ok(guard)
    }

    fn write(&mut self, index: usize, level: Level) -> Result<(), PinError> {
        self.controller.write(&mut self.held[index], level)
    }

    /// Release without touching levels; the caller already left them low.
    fn release(mut self) {
        for pin in self.held.drain(..) {
            self.controller.release(pin);
        }
    }
}

impl<P: PinController> Drop for PinGuard<'_, P> {
    fn drop(&mut self) {
        for mut pin in self.held.drain(..) {
            if let Err(err) = self.controller.write(&mut pin, Level::Low) {
                tracing::warn!(%err, pin = %pin.id(), "failed to drive pin low on release");
            }
            self.controller.release(pin);
        }
    }
}

/// Clears the in-flight motion when the actuation ends, however it ends.
struct MotionGuard<'a> {
    slot: &'a Mutex<Option<Command>>,
}

impl<'a> MotionGuard<'a> {
    fn enter(slot: &'a Mutex<Option<Command>>, command: Command) -> Self {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(command);
        Self { slot }
    }
}

impl Drop for MotionGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// The door actuator.
///
/// Operations are not serialised here: concurrent callers would fight over
/// the pins and get [`PinError::Busy`]. The controller owns the single-flight
/// guarantee.
pub struct Door<P> {
    controller: P,
    pins: DoorPins,
    timing: DoorTiming,
    interrupt: Notify,
    interrupt_requested: AtomicBool,
    motion: Mutex<Option<Command>>,
}

impl<P: PinController> Door<P> {
    /// Create a door driven by `controller` through `pins`.
    pub fn new(controller: P, pins: DoorPins, timing: DoorTiming) -> Self {
        Self {
            controller,
            pins,
            timing,
            interrupt: Notify::new(),
            interrupt_requested: AtomicBool::new(false),
            motion: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn pins(&self) -> DoorPins {
        self.pins
    }

    #[must_use]
    pub fn timing(&self) -> DoorTiming {
        self.timing
    }

    /// The actuation currently running, if any.
    #[must_use]
    pub fn motion(&self) -> Option<Command> {
        *self.motion.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the motor in the opening direction for the opening duration.
    ///
    /// # Errors
    ///
    /// See [`Door::actuate`].
    pub async fn open(&self) -> Result<(), DoorError> {
        self.actuate(Command::Open).await
    }

    /// Run the motor in the closing direction for the closing duration.
    ///
    /// # Errors
    ///
    /// See [`Door::actuate`].
    pub async fn close(&self) -> Result<(), DoorError> {
        self.actuate(Command::Close).await
    }

    /// Acquire the pins, set the direction for `command`, energise, wait,
    /// de-energise and release.
    ///
    /// # Errors
    ///
    /// Returns [`DoorError::Hardware`] when a pin cannot be acquired or
    /// driven, and [`DoorError::Interrupted`] when [`Door::interrupt`] is
    /// called during the wait. Pins are released in every case.
    pub async fn actuate(&self, command: Command) -> Result<(), DoorError> {
        // Registered before anything else so an interrupt arriving while the
        // pins are being set up is not lost.
        let interrupted = self.interrupt.notified();
        tokio::pin!(interrupted);
        interrupted.as_mut().enable();
        if self.interrupt_requested.swap(false, Ordering::SeqCst) {
            tracing::debug!(%command, "interrupt pending, not starting");
            return Err(DoorError::Interrupted);
        }

        let (a, b, duration) = match command {
            Command::Open => (Level::High, Level::Low, self.timing.opening),
            Command::Close => (Level::Low, Level::High, self.timing.closing),
        };

        let _motion = MotionGuard::enter(&self.motion, command);
        let mut guard = PinGuard::acquire(&self.controller, self.pins)?;
        guard.write(DIRECTION_A, a)?;
        guard.write(DIRECTION_B, b)?;
        guard.write(ENABLE, Level::High)?;
        tracing::debug!(%command, ?duration, "motor energised");

        let outcome = tokio::select! {
            () = tokio::time::sleep(duration) => Ok(()),
            () = interrupted.as_mut() => {
                self.interrupt_requested.store(false, Ordering::SeqCst);
                Err(DoorError::Interrupted)
            }
        };

        guard.write(ENABLE, Level::Low)?;
        guard.write(DIRECTION_A, Level::Low)?;
        guard.write(DIRECTION_B, Level::Low)?;
        guard.release();
        tracing::debug!(%command, "motor de-energised");
        outcome
    }

    /// Acquire the pins, force all three low and release them.
    ///
    /// Fails with [`PinError::Busy`] while an actuation holds the pins; call
    /// [`Door::interrupt`] and wait for it to finish first.
    ///
    /// # Errors
    ///
    /// Returns [`DoorError::Hardware`] when a pin cannot be acquired or
    /// driven.
    pub fn stop(&self) -> Result<(), DoorError> {
        let mut guard = PinGuard::acquire(&self.controller, self.pins)?;
        guard.write(ENABLE, Level::Low)?;
        guard.write(DIRECTION_A, Level::Low)?;
        guard.write(DIRECTION_B, Level::Low)?;
        guard.release();
        Ok(())
    }

    /// End the wait of the in-flight actuation.
    ///
    /// An actuation that has not reached its wait yet sees the request and
    /// returns [`DoorError::Interrupted`] without touching the pins. When the
    /// door is idle the request stays pending for the next actuation until
    /// [`Door::clear_interrupt`] drops it.
    pub fn interrupt(&self) {
        self.interrupt_requested.store(true, Ordering::SeqCst);
        self.interrupt.notify_waiters();
    }

    /// Drop a pending interrupt request.
    pub fn clear_interrupt(&self) {
        self.interrupt_requested.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{PinOp, RecordingPins};

    const A: PinId = PinId(17);
    const B: PinId = PinId(27);
    const EN: PinId = PinId(22);

    fn pins() -> DoorPins {
        DoorPins {
            direction_a: A,
            direction_b: B,
            enable: EN,
        }
    }

    fn door(controller: Arc<RecordingPins>) -> Door<Arc<RecordingPins>> {
        let timing = DoorTiming::new(Duration::from_secs(5), Duration::from_secs(7)).unwrap();
        Door::new(controller, pins(), timing)
    }

    #[test]
    fn should_reject_zero_durations() {
        assert_eq!(
            DoorTiming::new(Duration::ZERO, Duration::from_secs(1)),
            Err(InvalidTiming { which: "opening" })
        );
        assert_eq!(
            DoorTiming::new(Duration::from_secs(1), Duration::ZERO),
            Err(InvalidTiming { which: "closing" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_drive_open_sequence() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        let started = tokio::time::Instant::now();
        door.open().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(5));

        assert_eq!(
            controller.ops(),
            vec![
                PinOp::Acquire(A),
                PinOp::Acquire(B),
                PinOp::Acquire(EN),
                PinOp::Write(A, Level::High),
                PinOp::Write(B, Level::Low),
                PinOp::Write(EN, Level::High),
                PinOp::Write(EN, Level::Low),
                PinOp::Write(A, Level::Low),
                PinOp::Write(B, Level::Low),
                PinOp::Release(A),
                PinOp::Release(B),
                PinOp::Release(EN),
            ]
        );
        assert!(controller.held().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drive_close_sequence_with_closing_duration() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        let started = tokio::time::Instant::now();
        door.close().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(7));

        let writes = controller.writes();
        assert_eq!(
            &writes[..3],
            &[(A, Level::Low), (B, Level::High), (EN, Level::High)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_release_partial_acquisition_on_failure() {
        let controller = Arc::new(RecordingPins::default());
        controller.fail_acquire(EN);
        let door = door(Arc::clone(&controller));

        let result = door.open().await;

        assert!(matches!(
            result,
            Err(DoorError::Hardware(PinError::Acquire { pin, .. })) if pin == EN
        ));
        assert!(controller.held().is_empty());
        assert!(controller.ops().contains(&PinOp::Release(A)));
        assert!(controller.ops().contains(&PinOp::Release(B)));
        assert!(!controller.writes().contains(&(EN, Level::High)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_de_energise_when_a_write_fails() {
        let controller = Arc::new(RecordingPins::default());
        controller.fail_write(B);
        let door = door(Arc::clone(&controller));

        let result = door.open().await;

        assert!(matches!(result, Err(DoorError::Hardware(PinError::Write { .. }))));
        assert!(controller.held().is_empty());
        assert!(!controller.writes().contains(&(EN, Level::High)));
        assert_eq!(door.motion(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn should_end_wait_early_when_interrupted() {
        let controller = Arc::new(RecordingPins::default());
        let door = Arc::new(door(Arc::clone(&controller)));

        let task = tokio::spawn({
            let door = Arc::clone(&door);
            async move { door.open().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(door.motion(), Some(Command::Open));

        let interrupted_at = tokio::time::Instant::now();
        door.interrupt();
        let result = task.await.unwrap();

        assert!(matches!(result, Err(DoorError::Interrupted)));
        assert_eq!(interrupted_at.elapsed(), Duration::ZERO);
        assert_eq!(door.motion(), None);
        assert!(controller.held().is_empty());
        assert_eq!(controller.writes().last(), Some(&(B, Level::Low)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_start_when_interrupt_is_pending() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        door.interrupt();
        let result = door.open().await;

        assert!(matches!(result, Err(DoorError::Interrupted)));
        assert!(controller.ops().is_empty());
        assert_eq!(door.motion(), None);

        let started = tokio::time::Instant::now();
        door.open().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_normally_once_interrupt_is_cleared() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        door.interrupt();
        door.clear_interrupt();
        let started = tokio::time::Instant::now();
        door.open().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn should_release_pins_when_future_is_dropped() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        let result = tokio::time::timeout(Duration::from_secs(1), door.open()).await;

        assert!(result.is_err());
        assert!(controller.held().is_empty());
        assert_eq!(controller.writes().last(), Some(&(EN, Level::Low)));
        assert_eq!(door.motion(), None);
    }

    #[test]
    fn should_force_all_pins_low_on_stop() {
        let controller = Arc::new(RecordingPins::default());
        let door = door(Arc::clone(&controller));

        door.stop().unwrap();

        assert_eq!(
            controller.writes(),
            vec![(EN, Level::Low), (A, Level::Low), (B, Level::Low)]
        );
        assert!(controller.held().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_refuse_stop_while_pins_are_held() {
        let controller = Arc::new(RecordingPins::default());
        let door = Arc::new(door(Arc::clone(&controller)));

        let task = tokio::spawn({
            let door = Arc::clone(&door);
            async move { door.open().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(matches!(
            door.stop(),
            Err(DoorError::Hardware(PinError::Busy { pin })) if pin == A
        ));
        task.await.unwrap().unwrap();
    }
}
