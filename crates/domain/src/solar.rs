//! Sunrise and sunset computation.
//!
//! Implements the standard sunrise equation: mean solar anomaly, equation of
//! the centre, ecliptic longitude, declination and hour angle, evaluated for a
//! calendar date at a given [`Location`]. Sunrise and sunset correspond to an
//! apparent solar altitude of -0.833° (refraction plus solar disc radius).
//!
//! Accuracy is within a minute or so for inhabited latitudes, which is far
//! below the resolution a door schedule needs. Results are rounded to whole
//! seconds so the same inputs always produce the same instants.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::location::Location;
use crate::time::Timestamp;

/// Julian date of 2000-01-01 12:00 UTC.
const J2000: f64 = 2_451_545.0;
/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// `num_days_from_ce` of 2000-01-01.
const J2000_DAYS_FROM_CE: i32 = 730_120;
/// Obliquity of the ecliptic, in degrees.
const OBLIQUITY: f64 = 23.4397;
/// Argument of perihelion, in degrees.
const PERIHELION: f64 = 102.9372;
/// Apparent altitude of the sun's upper limb at sunrise and sunset.
const HORIZON: f64 = -0.833;

/// Whether the sun crosses the horizon on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daylight {
    /// The sun rises and sets.
    Normal {
        sunrise: Timestamp,
        sunset: Timestamp,
    },
    /// The sun stays above the horizon all day.
    PolarDay,
    /// The sun stays below the horizon all day.
    PolarNight,
}

/// Solar events for one calendar date at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarEvents {
    /// Solar noon.
    pub transit: Timestamp,
    pub daylight: Daylight,
}

/// Compute solar transit and sunrise/sunset for `date` at `location`.
#[must_use]
pub fn events(date: NaiveDate, location: &Location) -> SolarEvents {
    let days = f64::from(date.num_days_from_ce() - J2000_DAYS_FROM_CE);
    let mean_solar_noon = days - location.longitude() / 360.0;

    let anomaly = (357.5291 + 0.985_600_28 * mean_solar_noon).rem_euclid(360.0);
    let m = anomaly.to_radians();
    let centre = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
    let ecliptic = (anomaly + centre + 180.0 + PERIHELION).rem_euclid(360.0);
    let lambda = ecliptic.to_radians();

    let transit = J2000 + mean_solar_noon + 0.0053 * m.sin() - 0.0069 * (2.0 * lambda).sin();

    let sin_decl = lambda.sin() * OBLIQUITY.to_radians().sin();
    let cos_decl = sin_decl.asin().cos();
    let phi = location.latitude().to_radians();
    let cos_hour_angle =
        (HORIZON.to_radians().sin() - phi.sin() * sin_decl) / (phi.cos() * cos_decl);

    let daylight = if cos_hour_angle > 1.0 {
        Daylight::PolarNight
    } else if cos_hour_angle < -1.0 {
        Daylight::PolarDay
    } else {
        let hour_angle = cos_hour_angle.acos().to_degrees();
        Daylight::Normal {
            sunrise: from_julian(transit - hour_angle / 360.0),
            sunset: from_julian(transit + hour_angle / 360.0),
        }
    };

    SolarEvents {
        transit: from_julian(transit),
        daylight,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn from_julian(julian: f64) -> Timestamp {
    let seconds = ((julian - UNIX_EPOCH_JD) * 86_400.0).round() as i64;
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
