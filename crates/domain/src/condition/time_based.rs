//! Fixed wall-clock condition (`"HHhMM"`).

use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};

use crate::error::ParseError;
use crate::time::at_local_time;

/// Opens or closes at the same clock time every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBased {
    time: NaiveTime,
}

impl TimeBased {
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// `HHhMM` rendering, zero padded.
    #[must_use]
    pub fn value(&self) -> String {
        format!("{:02}h{:02}", self.hour(), self.minute())
    }

    /// The configured clock time on the local date of `now`.
    #[must_use]
    pub fn at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        at_local_time(now, now.date_naive(), self.time)
    }
}

impl FromStr for TimeBased {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedClock {
            value: value.to_string(),
        };

        let bytes = value.as_bytes();
        if bytes.len() != 5 || bytes[2] != b'h' {
            return Err(malformed());
        }
        let digit = |b: u8| {
            if b.is_ascii_digit() {
                Ok(u32::from(b - b'0'))
            } else {
                Err(malformed())
            }
        };
        let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
        let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;

        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            ParseError::ClockOutOfRange {
                value: value.to_string(),
            }
        })?;
        Ok(Self { time })
    }
}
