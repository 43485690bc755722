//! Boundary detection value types.
//!
//! These are the immutable signal collections the detection engine fuses:
//! silence periods from the audio track, periodic loudness samples used for
//! diagnostics, and the final per-file result handed back to the caller.

use serde::{Deserialize, Serialize};

/// A detected interval of silence on the analyzed audio track.
///
/// Bounds are stored as rounded milliseconds. The lookup tolerance is applied
/// at query time, not baked into the stored bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilencePeriod {
    /// Start of the silent interval in milliseconds.
    pub start_ms: u64,
    /// End of the silent interval in milliseconds.
    pub end_ms: u64,
}

impl SilencePeriod {
    /// Whether `timestamp_ms` falls inside this period expanded by
    /// `tolerance_ms` on both sides.
    pub fn contains(&self, timestamp_ms: u64, tolerance_ms: u64) -> bool {
        let lo = self.start_ms.saturating_sub(tolerance_ms);
        let hi = self.end_ms + tolerance_ms;
        timestamp_ms >= lo && timestamp_ms <= hi
    }

    /// Duration of the silent interval in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Whether any period in `periods` covers `timestamp_ms` (± tolerance).
pub fn any_silence_at(periods: &[SilencePeriod], timestamp_ms: u64, tolerance_ms: u64) -> bool {
    periods.iter().any(|p| p.contains(timestamp_ms, tolerance_ms))
}

/// The period covering `timestamp_ms` (± tolerance), if one exists.
pub fn silence_at(
    periods: &[SilencePeriod],
    timestamp_ms: u64,
    tolerance_ms: u64,
) -> Option<SilencePeriod> {
    periods
        .iter()
        .find(|p| p.contains(timestamp_ms, tolerance_ms))
        .copied()
}

/// One periodic loudness reading from the audio statistics collaborator.
///
/// Samples are ordered by timestamp and only ever read, never mutated. They
/// annotate debug output; detection itself never depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioLevelSample {
    /// Presentation timestamp in seconds.
    pub timestamp_secs: f64,
    /// RMS level in dBFS. `-inf` for digitally silent frames.
    pub mean_db: f64,
}

/// Latest sample at or before `secs`, assuming `samples` is ordered by time.
pub fn level_at(samples: &[AudioLevelSample], secs: f64) -> Option<AudioLevelSample> {
    samples
        .iter()
        .rev()
        .find(|s| s.timestamp_secs <= secs)
        .copied()
}

/// Result of one boundary detection run.
///
/// Either side may be unresolved; the sides are independent. `notes` collects
/// human-readable diagnostics, including one entry per unresolved side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryResult {
    /// Absolute start of programme content in seconds, if resolved.
    pub program_start: Option<f64>,
    /// Absolute end of programme content in seconds, if resolved.
    pub program_end: Option<f64>,
    /// Ordered diagnostic messages accumulated during resolution.
    pub notes: Vec<String>,
}

impl BoundaryResult {
    /// Both sides resolved.
    pub fn is_complete(&self) -> bool {
        self.program_start.is_some() && self.program_end.is_some()
    }

    /// Programme length in seconds when both sides resolved.
    pub fn program_length(&self) -> Option<f64> {
        match (self.program_start, self.program_end) {
            (Some(start), Some(end)) => Some((end - start).max(0.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_contains_with_tolerance() {
        let p = SilencePeriod {
            start_ms: 10500,
            end_ms: 12500,
        };

        assert!(p.contains(10500, 0));
        assert!(p.contains(12500, 0));
        assert!(!p.contains(10499, 0));

        // Tolerance expands both edges
        assert!(p.contains(10300, 200));
        assert!(p.contains(12700, 200));
        assert!(!p.contains(10299, 200));
        assert!(!p.contains(12701, 200));
    }

    #[test]
    fn test_silence_contains_near_zero() {
        let p = SilencePeriod {
            start_ms: 100,
            end_ms: 900,
        };
        // Tolerance larger than start must not underflow
        assert!(p.contains(0, 200));
    }

    #[test]
    fn test_any_silence_at() {
        let periods = vec![
            SilencePeriod {
                start_ms: 0,
                end_ms: 2000,
            },
            SilencePeriod {
                start_ms: 10500,
                end_ms: 12500,
            },
        ];

        assert!(any_silence_at(&periods, 1000, 200));
        assert!(any_silence_at(&periods, 11000, 200));
        assert!(!any_silence_at(&periods, 5000, 200));
    }

    #[test]
    fn test_level_at_picks_latest_at_or_before() {
        let samples = vec![
            AudioLevelSample {
                timestamp_secs: 0.0,
                mean_db: -60.0,
            },
            AudioLevelSample {
                timestamp_secs: 1.0,
                mean_db: -35.0,
            },
            AudioLevelSample {
                timestamp_secs: 2.0,
                mean_db: -20.0,
            },
        ];

        assert_eq!(level_at(&samples, 1.5).unwrap().mean_db, -35.0);
        assert_eq!(level_at(&samples, 2.0).unwrap().mean_db, -20.0);
        assert_eq!(level_at(&samples, 0.0).unwrap().mean_db, -60.0);
        assert!(level_at(&samples, -0.5).is_none());
    }

    #[test]
    fn test_program_length() {
        let result = BoundaryResult {
            program_start: Some(120.0),
            program_end: Some(1920.0),
            notes: Vec::new(),
        };
        assert!(result.is_complete());
        assert_eq!(result.program_length(), Some(1800.0));

        let partial = BoundaryResult {
            program_start: Some(120.0),
            program_end: None,
            notes: vec!["No valid black period found at end".to_string()],
        };
        assert!(!partial.is_complete());
        assert_eq!(partial.program_length(), None);
    }
}
