//! Common error types used across the workspace.
//!
//! Parsing is the only fallible operation in the domain: once a condition,
//! a location or a duration has been built it cannot fail any more.

/// A configuration value could not be decoded.
///
/// Every variant carries the offending raw input so the operator can find it
/// in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The clock time does not follow the `HHhMM` layout.
    #[error("malformed clock time {value:?}, expected HHhMM")]
    MalformedClock { value: String },

    /// The clock time is well formed but the hour or minute is out of range.
    #[error("clock time {value:?} is out of range")]
    ClockOutOfRange { value: String },

    /// The duration does not follow the `[+-]<n>h<n>m<n>s` grammar.
    #[error("invalid duration {value:?}")]
    InvalidDuration { value: String },

    /// The duration parsed but must be strictly positive in this position.
    #[error("duration {value:?} must be positive")]
    NonPositiveDuration { value: String },

    /// Latitude outside `[-90, 90]` or not a finite number.
    #[error("latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange { value: String },

    /// Longitude outside `[-180, 180]` or not a finite number.
    #[error("longitude {value} is outside [-180, 180]")]
    LongitudeOutOfRange { value: String },

    /// The condition mode is neither `time_based` nor `sun_based`.
    #[error("unknown condition mode {value:?}")]
    UnknownMode { value: String },

    /// The door status is not one of the known variants.
    #[error("unknown door status {value:?}")]
    UnknownStatus { value: String },
}

impl ParseError {
    /// The raw input that failed to parse.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::MalformedClock { value }
            | Self::ClockOutOfRange { value }
            | Self::InvalidDuration { value }
            | Self::NonPositiveDuration { value }
            | Self::LatitudeOutOfRange { value }
            | Self::LongitudeOutOfRange { value }
            | Self::UnknownMode { value }
            | Self::UnknownStatus { value } => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_offending_value() {
        let err = ParseError::MalformedClock {
            value: "6:30".to_string(),
        };
        assert_eq!(err.value(), "6:30");
    }

    #[test]
    fn should_mention_value_in_message() {
        let err = ParseError::ClockOutOfRange {
            value: "25h00".to_string(),
        };
        assert_eq!(err.to_string(), "clock time \"25h00\" is out of range");
    }
}
