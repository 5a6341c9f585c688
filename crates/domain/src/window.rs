//! Opening-window policy.

use chrono::{DateTime, TimeZone};

use crate::status::DoorStatus;

/// Status the door should be in at `now` given today's boundaries.
///
/// The window is `[open_at, close_at)`. When `close_at` is earlier than
/// `open_at` the window wraps across midnight and the door stays open from
/// `open_at` until `close_at` the following day. Equal boundaries give an
/// empty window.
#[must_use]
pub fn desired_status<Tz: TimeZone>(
    now: &DateTime<Tz>,
    open_at: &DateTime<Tz>,
    close_at: &DateTime<Tz>,
) -> DoorStatus {
    let open = if open_at <= close_at {
        now >= open_at && now < close_at
    } else {
        now >= open_at || now < close_at
    };
    if open {
        DoorStatus::Open
    } else {
        DoorStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    #[test]
    fn should_open_inside_window() {
        assert_eq!(desired_status(&at(12, 0), &at(7, 0), &at(21, 0)), DoorStatus::Open);
    }

    #[test]
    fn should_include_opening_and_exclude_closing_boundary() {
        assert_eq!(desired_status(&at(7, 0), &at(7, 0), &at(21, 0)), DoorStatus::Open);
        assert_eq!(desired_status(&at(21, 0), &at(7, 0), &at(21, 0)), DoorStatus::Closed);
    }

    #[test]
    fn should_close_outside_window() {
        assert_eq!(desired_status(&at(6, 59), &at(7, 0), &at(21, 0)), DoorStatus::Closed);
        assert_eq!(desired_status(&at(23, 0), &at(7, 0), &at(21, 0)), DoorStatus::Closed);
    }

    #[test]
    fn should_wrap_across_midnight() {
        let open_at = at(22, 0);
        let close_at = at(2, 0);
        assert_eq!(desired_status(&at(23, 30), &open_at, &close_at), DoorStatus::Open);
        assert_eq!(desired_status(&at(1, 0), &open_at, &close_at), DoorStatus::Open);
        assert_eq!(desired_status(&at(2, 0), &open_at, &close_at), DoorStatus::Closed);
        assert_eq!(desired_status(&at(12, 0), &open_at, &close_at), DoorStatus::Closed);
    }

    #[test]
    fn should_stay_closed_on_empty_window() {
        let boundary = at(12, 0);
        assert_eq!(desired_status(&at(12, 0), &boundary, &boundary), DoorStatus::Closed);
        assert_eq!(desired_status(&at(8, 0), &boundary, &boundary), DoorStatus::Closed);
    }
}
