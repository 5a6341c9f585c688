//! Solar-offset condition: sunrise/sunset plus a signed offset.

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone};

use crate::duration::{format_signed, parse_signed};
use crate::error::ParseError;
use crate::location::Location;
use crate::solar::{self, Daylight};
use crate::time::at_local_time;

/// Opens at sunrise and closes at sunset, each shifted by `offset`.
///
/// On a polar day the door is open for the whole local day; on a polar night
/// both boundaries collapse onto solar noon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunBased {
    offset: TimeDelta,
    location: Location,
}

impl SunBased {
    #[must_use]
    pub fn new(offset: TimeDelta, location: Location) -> Self {
        Self { offset, location }
    }

    /// Parse a signed offset such as `"-30m"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidDuration`] when the offset is malformed.
    pub fn parse(value: &str, location: Location) -> Result<Self, ParseError> {
        parse_signed(value).map(|offset| Self::new(offset, location))
    }

    #[must_use]
    pub fn offset(&self) -> TimeDelta {
        self.offset
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// `"<offset> @ <lat>,<lon>"`, e.g. `"-30m @ 48.8566,2.3522"`.
    #[must_use]
    pub fn value(&self) -> String {
        format!("{} @ {}", format_signed(self.offset), self.location)
    }

    /// Sunrise on the local date of `now`, shifted by the offset.
    #[must_use]
    pub fn opening_time<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let date = now.date_naive();
        let events = solar::events(date, &self.location);
        let base = match events.daylight {
            Daylight::Normal { sunrise, .. } => sunrise.with_timezone(&now.timezone()),
            Daylight::PolarDay => at_local_time(now, date, NaiveTime::MIN),
            Daylight::PolarNight => events.transit.with_timezone(&now.timezone()),
        };
        self.shift(base)
    }

    /// Sunset on the local date of `now`, shifted by the offset.
    #[must_use]
    pub fn closing_time<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let date = now.date_naive();
        let events = solar::events(date, &self.location);
        let base = match events.daylight {
            Daylight::Normal { sunset, .. } => sunset.with_timezone(&now.timezone()),
            Daylight::PolarDay => {
                let next = date.succ_opt().unwrap_or(date);
                at_local_time(now, next, NaiveTime::MIN)
            }
            Daylight::PolarNight => events.transit.with_timezone(&now.timezone()),
        };
        self.shift(base)
    }

    fn shift<Tz: TimeZone>(&self, instant: DateTime<Tz>) -> DateTime<Tz> {
        instant
            .clone()
            .checked_add_signed(self.offset)
            .unwrap_or(instant)
    }
}
