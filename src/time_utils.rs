//! Date parsing for command-line input.

use crate::error::{PlannerError, Result};
use chrono::{Duration, Local, NaiveDate};

/// Parse a calendar date relative to `today`.
///
/// Accepts `today`, `yesterday`, a day offset such as `-3d`, or an ISO
/// `YYYY-MM-DD` date.
pub fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {},
    }

    if let Some(num) = input.strip_suffix('d') {
        if let Ok(days) = num.parse::<i64>() {
            return Ok(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        PlannerError::validation(
            "date",
            format!(
                "'{}' is not a date; use YYYY-MM-DD, 'today', 'yesterday' or an offset like '-3d'",
                input
            ),
        )
    })
}

/// Parse a date relative to the local calendar day.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_date_from(input, today())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_date_from("today", base()).unwrap(), base());
        assert_eq!(parse_date_from(" Yesterday ", base()).unwrap(), base() - Duration::days(1));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(parse_date_from("-3d", base()).unwrap(), base() - Duration::days(3));
        assert_eq!(parse_date_from("2d", base()).unwrap(), base() + Duration::days(2));
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(
            parse_date_from("2025-01-31", base()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_date_from("31/01/2025", base()).unwrap_err();
        assert_eq!(err.to_error_code(), "VALIDATION_ERROR");
        assert!(parse_date_from("xd", base()).is_err());
    }
}
