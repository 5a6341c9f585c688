//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// UTC timestamp used for event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Resolve a wall-clock time on `date` in the time zone of `reference`.
///
/// Ambiguous local times (DST fall-back) resolve to the earliest instant.
/// Non-existent local times (DST spring-forward gap) are interpreted with the
/// UTC offset in force at `reference`.
#[must_use]
pub fn at_local_time<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    date: NaiveDate,
    time: NaiveTime,
) -> DateTime<Tz> {
    let naive = date.and_time(time);
    let tz = reference.timezone();
    tz.from_local_datetime(&naive).earliest().unwrap_or_else(|| {
        let offset = reference.offset().fix();
        tz.from_utc_datetime(&(naive - offset))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_resolve_time_in_reference_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let reference = tz.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let time = NaiveTime::from_hms_opt(6, 30, 0).unwrap();

        let resolved = at_local_time(&reference, date, time);
        assert_eq!(resolved, tz.with_ymd_and_hms(2024, 6, 21, 6, 30, 0).unwrap());
        assert_eq!(
            resolved.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 6, 21, 4, 30, 0).unwrap()
        );
    }
}
