//! Input validation shared by the repository and HTTP layers.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Minimum number of digits in a seeker PIN.
pub const PIN_MIN_DIGITS: usize = 4;

/// Maximum number of digits in a seeker PIN.
pub const PIN_MAX_DIGITS: usize = 8;

/// Parse an ISO-8601 timestamp supplied by a client.
///
/// Accepts RFC 3339 with `Z` or a numeric offset, and offset-less values
/// (`2024-05-01T10:00:00`, optionally with fractional seconds), which are
/// taken as UTC. `field` names the offending field in the error.
pub fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, CoreError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            CoreError::Validation(format!(
                "Invalid datetime format for {field}: '{value}' is not ISO-8601"
            ))
        })
}

/// Parse an optional timestamp field, keeping `None` as `None`.
pub fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Timestamp>, CoreError> {
    value.map(|v| parse_timestamp(field, v)).transpose()
}

/// Require a non-blank text field.
pub fn validate_required_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// A PIN is 4 to 8 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), CoreError> {
    let len = pin.len();
    if !(PIN_MIN_DIGITS..=PIN_MAX_DIGITS).contains(&len) || !pin.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(CoreError::Validation(format!(
            "PIN must be {PIN_MIN_DIGITS} to {PIN_MAX_DIGITS} digits"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_rfc3339_with_z() {
        let ts = parse_timestamp("started_at", "2024-05-01T10:30:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset_normalizes_to_utc() {
        let ts = parse_timestamp("started_at", "2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = parse_timestamp("completed_at", "2024-05-01T10:30:00.250").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_garbage_fails_with_field_name() {
        let err = parse_timestamp("completed_at", "yesterday").unwrap_err();
        match err {
            CoreError::Validation(msg) => assert!(msg.contains("completed_at")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_optional_none() {
        assert_eq!(parse_optional_timestamp("started_at", None).unwrap(), None);
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("title", "Dishes").is_ok());
        assert!(validate_required_text("title", "   ").is_err());
    }

    #[test]
    fn test_pin_rules() {
        assert!(validate_pin("0606").is_ok());
        assert!(validate_pin("12345678").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("123456789").is_err());
        assert!(validate_pin("12a4").is_err());
    }
}
