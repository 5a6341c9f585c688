//! # coop-domain
//!
//! Pure domain model for the coop door controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, signed durations
//! - Define **Conditions** (rules that yield today's opening/closing instants)
//! - Define the **Location** and the solar computation behind sun-based conditions
//! - Define the door's logical **status** and the opening-window policy
//! - Define **Events** (status changes, actuation failures)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO crates.
//! Hardware access is expressed as traits in the `app` crate (ports).

pub mod duration;
pub mod error;
pub mod time;

pub mod condition;
pub mod event;
pub mod location;
pub mod solar;
pub mod status;
pub mod window;
