//! Condition — a rule that yields today's opening or closing instant.
//!
//! Two variants exist: a fixed wall-clock time ([`TimeBased`]) and an offset
//! from sunrise/sunset at a [`Location`] ([`SunBased`]). Construction is the
//! only fallible step; evaluation is a pure function of `now`.

mod sun_based;
mod time_based;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::location::Location;

pub use sun_based::SunBased;
pub use time_based::TimeBased;

/// Discriminator of a [`Condition`], as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    TimeBased,
    SunBased,
}

impl Mode {
    /// Stable textual tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimeBased => "time_based",
            Self::SunBased => "sun_based",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time_based" => Ok(Self::TimeBased),
            "sun_based" => Ok(Self::SunBased),
            other => Err(ParseError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// A schedule rule for one door boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    TimeBased(TimeBased),
    SunBased(SunBased),
}

impl Condition {
    /// Build a condition from its configured mode and raw value.
    ///
    /// `location` is only consulted by sun-based conditions.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] of the selected variant.
    pub fn new(mode: Mode, value: &str, location: Location) -> Result<Self, ParseError> {
        match mode {
            Mode::TimeBased => TimeBased::from_str(value).map(Self::TimeBased),
            Mode::SunBased => SunBased::parse(value, location).map(Self::SunBased),
        }
    }

    /// The condition's mode tag.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::TimeBased(_) => Mode::TimeBased,
            Self::SunBased(_) => Mode::SunBased,
        }
    }

    /// Canonical textual form of the configured value.
    #[must_use]
    pub fn value(&self) -> String {
        match self {
            Self::TimeBased(c) => c.value(),
            Self::SunBased(c) => c.value(),
        }
    }

    /// Opening instant for the local date of `now`.
    #[must_use]
    pub fn opening_time<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            Self::TimeBased(c) => c.at(now),
            Self::SunBased(c) => c.opening_time(now),
        }
    }

    /// Closing instant for the local date of `now`.
    #[must_use]
    pub fn closing_time<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            Self::TimeBased(c) => c.at(now),
            Self::SunBased(c) => c.closing_time(now),
        }
    }

    /// Serializable description of this condition.
    #[must_use]
    pub fn info(&self) -> ConditionInfo {
        ConditionInfo {
            mode: self.mode(),
            value: self.value(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.mode(), self.value())
    }
}

/// Mode and value of a condition, for status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub mode: Mode,
    pub value: String,
}
