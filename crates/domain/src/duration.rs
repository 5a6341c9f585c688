//! Signed duration grammar shared by sun-based offsets and door timings.
//!
//! Accepts an optional sign followed by `<integer><unit>` groups where the
//! unit is `h`, `m` or `s` (`"30m"`, `"-1h15m"`, `"+45s"`), or the bare
//! literal `"0"`.

use std::fmt::Write as _;

use chrono::TimeDelta;

use crate::error::ParseError;

/// Parse a signed duration such as `"-1h15m"`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidDuration`] for empty input, unknown units,
/// a unit without a number, trailing digits or arithmetic overflow.
pub fn parse_signed(value: &str) -> Result<TimeDelta, ParseError> {
    let invalid = || ParseError::InvalidDuration {
        value: value.to_string(),
    };

    let (negative, body) = if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (false, rest)
    } else {
        (false, value)
    };

    if body == "0" {
        return Ok(TimeDelta::zero());
    }
    if body.is_empty() {
        return Err(invalid());
    }

    let mut total: i64 = 0;
    let mut number: Option<i64> = None;
    for c in body.chars() {
        if let Some(digit) = c.to_digit(10) {
            let next = number
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(i64::from(digit)))
                .ok_or_else(invalid)?;
            number = Some(next);
            continue;
        }

        let factor = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        let n = number.take().ok_or_else(invalid)?;
        total = n
            .checked_mul(factor)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
    }
    if number.is_some() {
        return Err(invalid());
    }

    let total = if negative { -total } else { total };
    TimeDelta::try_seconds(total).ok_or_else(invalid)
}

/// Parse a strictly positive duration such as `"1m30s"`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidDuration`] if the grammar does not match and
/// [`ParseError::NonPositiveDuration`] for zero or negative values.
pub fn parse_positive(value: &str) -> Result<std::time::Duration, ParseError> {
    let delta = parse_signed(value)?;
    if delta <= TimeDelta::zero() {
        return Err(ParseError::NonPositiveDuration {
            value: value.to_string(),
        });
    }
    delta.to_std().map_err(|_| ParseError::NonPositiveDuration {
        value: value.to_string(),
    })
}

/// Render a duration in canonical signed form (`"+1h30m"`, `"-45m"`, `"+0s"`).
#[must_use]
pub fn format_signed(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let sign = if total < 0 { '-' } else { '+' };
    let secs = total.unsigned_abs();
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);

    let mut out = String::new();
    out.push(sign);
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if seconds > 0 || secs == 0 {
        let _ = write!(out, "{seconds}s");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_single_unit() {
        assert_eq!(parse_signed("30m").unwrap(), TimeDelta::minutes(30));
        assert_eq!(parse_signed("2h").unwrap(), TimeDelta::hours(2));
        assert_eq!(parse_signed("45s").unwrap(), TimeDelta::seconds(45));
    }

    #[test]
    fn should_parse_compound_negative_duration() {
        assert_eq!(
            parse_signed("-1h15m").unwrap(),
            -(TimeDelta::hours(1) + TimeDelta::minutes(15))
        );
    }

    #[test]
    fn should_parse_explicit_plus_sign() {
        assert_eq!(parse_signed("+1m30s").unwrap(), TimeDelta::seconds(90));
    }

    #[test]
    fn should_parse_bare_zero() {
        assert_eq!(parse_signed("0").unwrap(), TimeDelta::zero());
        assert_eq!(parse_signed("-0").unwrap(), TimeDelta::zero());
    }

    #[test]
    fn should_reject_malformed_durations() {
        for raw in ["", "-", "m", "10", "1x", "1h30", "1.5h", " 5m", "h5"] {
            assert!(
                matches!(parse_signed(raw), Err(ParseError::InvalidDuration { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn should_reject_overflowing_duration() {
        assert!(parse_signed("99999999999999999999h").is_err());
    }

    #[test]
    fn should_parse_positive_duration() {
        assert_eq!(
            parse_positive("1m5s").unwrap(),
            std::time::Duration::from_secs(65)
        );
    }

    #[test]
    fn should_reject_zero_and_negative_when_positive_required() {
        assert!(matches!(
            parse_positive("0"),
            Err(ParseError::NonPositiveDuration { .. })
        ));
        assert!(matches!(
            parse_positive("-5s"),
            Err(ParseError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn should_format_canonical_form() {
        assert_eq!(format_signed(TimeDelta::minutes(90)), "+1h30m");
        assert_eq!(format_signed(-TimeDelta::minutes(45)), "-45m");
        assert_eq!(format_signed(TimeDelta::seconds(3601)), "+1h1s");
        assert_eq!(format_signed(TimeDelta::zero()), "+0s");
    }

    #[test]
    fn should_parse_what_it_formats() {
        let delta = -(TimeDelta::hours(2) + TimeDelta::seconds(5));
        assert_eq!(parse_signed(&format_signed(delta)).unwrap(), delta);
    }
}
