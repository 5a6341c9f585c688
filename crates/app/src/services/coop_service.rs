//! Coop service — the door controller.
//!
//! Holds the opening and closing conditions, the door and the last-known
//! status. A periodic [`CoopService::check`] drives the door towards the
//! status implied by the schedule; [`CoopService::open`] and
//! [`CoopService::close`] are manual overrides. Every actuation goes through
//! one single-flight guard: a request arriving while the motor runs is
//! rejected, never queued.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;
use tokio::sync::Mutex;

use coop_domain::condition::{Condition, ConditionInfo};
use coop_domain::event::{Event, EventKind};
use coop_domain::status::{Command, DoorStatus};
use coop_domain::window::desired_status;

use crate::door::{Door, DoorError};
use crate::error::{CoopError, error_chain};
use crate::ports::{EventPublisher, PinController};

/// Result of one [`CoopService::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The recorded status already matches the schedule.
    InSync(DoorStatus),
    /// An actuation ran and the new status was recorded.
    Actuated(DoorStatus),
    /// The actuation hit a hardware fault; status is now `Error`.
    Failed,
    /// The actuation was stopped; status is now `Unknown`.
    Interrupted,
    /// Another actuation was in flight; nothing changed.
    Busy,
}

/// Who asked for an actuation. Only manual requests report rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Schedule,
    Manual,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoopSnapshot {
    pub status: DoorStatus,
    pub desired: DoorStatus,
    pub moving: Option<Command>,
    pub opening: ConditionInfo,
    pub closing: ConditionInfo,
    pub opening_at: DateTime<FixedOffset>,
    pub closing_at: DateTime<FixedOffset>,
}

/// The door controller.
pub struct CoopService<P, E> {
    opening: Condition,
    closing: Condition,
    door: Door<P>,
    publisher: E,
    status: RwLock<DoorStatus>,
    actuation: Mutex<()>,
}

impl<P, E> CoopService<P, E>
where
    P: PinController + Send + Sync,
    E: EventPublisher + Send + Sync,
{
    /// Create a controller with status [`DoorStatus::Unknown`].
    pub fn new(opening: Condition, closing: Condition, door: Door<P>, publisher: E) -> Self {
        Self {
            opening,
            closing,
            door,
            publisher,
            status: RwLock::new(DoorStatus::Unknown),
            actuation: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn opening_condition(&self) -> &Condition {
        &self.opening
    }

    #[must_use]
    pub fn closing_condition(&self) -> &Condition {
        &self.closing
    }

    #[must_use]
    pub fn door(&self) -> &Door<P> {
        &self.door
    }

    /// Last recorded status. Never waits for an actuation.
    #[must_use]
    pub fn status(&self) -> DoorStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compare the schedule with the recorded status and actuate on a
    /// mismatch.
    ///
    /// Faults are recorded and published, never returned: the next check
    /// tries again since the recorded status still differs.
    #[tracing::instrument(skip_all, fields(now = %now.naive_local()))]
    pub async fn check<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CheckOutcome {
        let open_at = self.opening.opening_time(now);
        let close_at = self.closing.closing_time(now);
        let desired = desired_status(now, &open_at, &close_at);
        let current = self.status();
        if current.is_moving() || self.door.motion().is_some() {
            tracing::debug!(%current, %desired, "actuation in flight, skipping check");
            return CheckOutcome::Busy;
        }
        if current == desired {
            tracing::trace!(%current, "door in sync with schedule");
            return CheckOutcome::InSync(current);
        }
        let Some(command) = Command::towards(desired) else {
            return CheckOutcome::InSync(current);
        };

        tracing::info!(%current, %desired, "schedule requires actuation");
        match self.actuate(command, Trigger::Schedule).await {
            Ok(status) => CheckOutcome::Actuated(status),
            Err(CoopError::ConcurrencyConflict) => CheckOutcome::Busy,
            Err(CoopError::Interrupted) => CheckOutcome::Interrupted,
            Err(_) => CheckOutcome::Failed,
        }
    }

    /// Open the door regardless of the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`CoopError::ConcurrencyConflict`] if an actuation is in
    /// flight, [`CoopError::HardwareFault`] on a pin failure (status becomes
    /// `Error`) and [`CoopError::Interrupted`] if stopped (status becomes
    /// `Unknown`).
    #[tracing::instrument(skip(self))]
    pub async fn open(&self) -> Result<DoorStatus, CoopError> {
        self.actuate(Command::Open, Trigger::Manual).await
    }

    /// Close the door regardless of the schedule.
    ///
    /// # Errors
    ///
    /// Same as [`CoopService::open`].
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) -> Result<DoorStatus, CoopError> {
        self.actuate(Command::Close, Trigger::Manual).await
    }

    /// Interrupt the running actuation, wait for it to hand the pins back,
    /// then force every pin low.
    ///
    /// # Errors
    ///
    /// Returns [`CoopError::HardwareFault`] if the pins cannot be driven.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), CoopError> {
        let moving = self.door.motion().or_else(|| match self.status() {
            DoorStatus::Opening => Some(Command::Open),
            DoorStatus::Closing => Some(Command::Close),
            _ => None,
        });
        self.door.interrupt();
        let _flight = self.actuation.lock().await;
        self.door.clear_interrupt();

        if let Err(err) = self.door.stop() {
            tracing::error!(error = %error_chain(&err), "failed to de-energise door");
            return Err(err.into());
        }
        tracing::info!(?moving, "door stopped");
        if moving.is_some() {
            self.publish(EventKind::Stopped).await;
        }
        Ok(())
    }

    /// Record `status` without moving the door.
    ///
    /// Used when the operator knows the physical position, e.g. after a
    /// restart.
    ///
    /// # Errors
    ///
    /// Returns [`CoopError::InvalidOverride`] for anything but `Open` or
    /// `Closed`, and [`CoopError::ConcurrencyConflict`] while an actuation is
    /// in flight.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, status: DoorStatus) -> Result<DoorStatus, CoopError> {
        if !status.is_settled() {
            return Err(CoopError::InvalidOverride(status));
        }
        let Ok(_flight) = self.actuation.try_lock() else {
            return Err(CoopError::ConcurrencyConflict);
        };

        let previous = self.replace_status(status);
        tracing::info!(from = %previous, to = %status, "status overridden");
        if previous != status {
            self.publish(EventKind::StatusChanged {
                from: previous,
                to: status,
            })
            .await;
        }
        Ok(status)
    }

    /// Describe the controller as seen at `now`.
    #[must_use]
    pub fn snapshot<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CoopSnapshot {
        let opening_at = self.opening.opening_time(now);
        let closing_at = self.closing.closing_time(now);
        CoopSnapshot {
            status: self.status(),
            desired: desired_status(now, &opening_at, &closing_at),
            moving: self.door.motion(),
            opening: self.opening.info(),
            closing: self.closing.info(),
            opening_at: opening_at.fixed_offset(),
            closing_at: closing_at.fixed_offset(),
        }
    }

    async fn actuate(&self, command: Command, trigger: Trigger) -> Result<DoorStatus, CoopError> {
        let Ok(_flight) = self.actuation.try_lock() else {
            tracing::debug!(%command, ?trigger, "actuation already in flight, rejecting");
            if trigger == Trigger::Manual {
                self.publish(EventKind::ActuationRejected { command }).await;
            }
            return Err(CoopError::ConcurrencyConflict);
        };

        let previous = self.replace_status(command.in_flight());
        tracing::info!(%command, "actuating door");

        let (to, result) = match self.door.actuate(command).await {
            Ok(()) => {
                let to = command.target();
                tracing::info!(%command, status = %to, "actuation complete");
                (to, Ok(to))
            }
            Err(DoorError::Interrupted) => {
                tracing::warn!(%command, "actuation interrupted, door position unknown");
                (DoorStatus::Unknown, Err(CoopError::Interrupted))
            }
            Err(DoorError::Hardware(err)) => {
                let reason = error_chain(&err);
                tracing::error!(%command, error = %reason, "actuation failed");
                self.publish(EventKind::ActuationFailed { command, reason })
                    .await;
                (DoorStatus::Error, Err(CoopError::HardwareFault(err)))
            }
        };

        self.replace_status(to);
        if previous != to {
            self.publish(EventKind::StatusChanged { from: previous, to })
                .await;
        }
        result
    }

    fn replace_status(&self, status: DoorStatus) -> DoorStatus {
        let mut current = self.status.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, status)
    }

    async fn publish(&self, kind: EventKind) {
        if let Err(err) = self.publisher.publish(Event::new(kind)).await {
            tracing::warn!(%err, "failed to publish event");
        }
    }
}

impl<P, E> fmt::Debug for CoopService<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoopService")
            .field("opening", &self.opening)
            .field("closing", &self.closing)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
