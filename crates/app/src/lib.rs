//! # coop-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PinController` — exclusive access to the motor driver's output pins
//!   - `EventPublisher` — fan-out of controller events
//! - Provide the **door actuator**, which turns a command into a timed pin
//!   sequence that can be interrupted
//! - Provide the **controller** use-case (`CoopService`): periodic check,
//!   manual open/close/stop, status override, single-flight actuation
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `coop-domain` only (plus `tokio::sync`/`tokio::time` for the
//! actuation lock and timed waits).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod door;
pub mod error;
pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
