//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod coop_service;

pub use coop_service::{CheckOutcome, CoopService, CoopSnapshot};
