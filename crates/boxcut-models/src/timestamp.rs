//! Timestamp parsing and formatting.
//!
//! Shared by the CLI (explicit `--start`/`--end` trim points) and by console
//! reporting. Supports `HH:MM:SS`, `MM:SS` and plain `SS`, each with an
//! optional fractional part.

use thiserror::Error;

/// Maximum reasonable recording duration (24 hours in seconds).
pub const MAX_RECORDING_SECS: f64 = 86400.0;

/// Timestamp parsing/validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,

    #[error("timestamp cannot be negative")]
    Negative,

    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("invalid timestamp format '{0}' (use HH:MM:SS, MM:SS or SS)")]
    InvalidFormat(String),

    #[error("start time must be before end time")]
    StartNotBeforeEnd,

    #[error("timestamp exceeds maximum recording duration")]
    ExceedsMaxDuration,
}

/// Parse a timestamp string to total seconds.
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => (0.0, 0.0, parse_component("seconds", s)?),
        [m, s] => (
            0.0,
            parse_component("minutes", m)?,
            parse_component("seconds", s)?,
        ),
        [h, m, s] => (
            parse_component("hours", h)?,
            parse_component("minutes", m)?,
            parse_component("seconds", s)?,
        ),
        _ => return Err(TimestampError::InvalidFormat(ts.to_string())),
    };

    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return Err(TimestampError::Negative);
    }

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_component(name: &'static str, value: &str) -> Result<f64, TimestampError> {
    value
        .parse()
        .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))
}

/// Format seconds as `HH:MM:SS` (or `HH:MM:SS.mmm` when fractional).
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Validate an explicit trim range; returns (start_secs, end_secs).
pub fn validate_range(start: &str, end: &str) -> Result<(f64, f64), TimestampError> {
    let start_secs = parse_timestamp(start)?;
    let end_secs = parse_timestamp(end)?;

    if start_secs >= end_secs {
        return Err(TimestampError::StartNotBeforeEnd);
    }
    if start_secs > MAX_RECORDING_SECS || end_secs > MAX_RECORDING_SECS {
        return Err(TimestampError::ExceedsMaxDuration);
    }

    Ok((start_secs, end_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("01:30:45").unwrap(), 5445.0);
        assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
        assert!((parse_timestamp("00:00:30.500").unwrap() - 30.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(parse_timestamp(""), Err(TimestampError::Empty)));
        assert!(matches!(
            parse_timestamp("abc"),
            Err(TimestampError::InvalidValue(_, _))
        ));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("-5"),
            Err(TimestampError::Negative)
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(90.0), "00:01:30");
        assert_eq!(format_seconds(3661.0), "01:01:01");
        assert_eq!(format_seconds(30.5), "00:00:30.500");
    }

    #[test]
    fn test_validate_range() {
        let (start, end) = validate_range("00:02:00", "00:30:00").unwrap();
        assert_eq!(start, 120.0);
        assert_eq!(end, 1800.0);

        assert!(matches!(
            validate_range("00:30:00", "00:02:00"),
            Err(TimestampError::StartNotBeforeEnd)
        ));
    }
}
