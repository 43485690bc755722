//! Boundary resolution.
//!
//! Pure fusion of the two independently-sampled signals: per-frame similarity
//! against the blank reference, and the file-wide silence interval list. No
//! I/O, no shared mutable state; the detector hands in immutable collections
//! and reads back offsets.

use boxcut_models::{any_silence_at, SilencePeriod};

use crate::frame::Frame;

/// Minimum similarity for a frame to count as blank.
pub const SIMILARITY_THRESHOLD: f64 = 0.92;
/// Required number of consecutive valid frames to confirm a boundary.
pub const REQUIRED_RUN: usize = 2;
/// Slack applied around silence periods when matching frame timestamps.
pub const SILENCE_TOLERANCE_MS: u64 = 200;

/// Per-frame validity: blank-like AND inside a silence period (± tolerance).
///
/// Frame timestamps are absolute, so the end window's offset is already
/// accounted for before the silence lookup.
pub fn build_validity_mask(
    frames: &[Frame],
    silences: &[SilencePeriod],
    threshold: f64,
    tolerance_ms: u64,
) -> Vec<bool> {
    frames
        .iter()
        .map(|frame| {
            frame.similarity() >= threshold
                && any_silence_at(silences, frame.timestamp_ms, tolerance_ms)
        })
        .collect()
}

/// Forward scan for the first run of `run` consecutive `true` entries.
///
/// Returns the last index of that confirming run. When several disjoint runs
/// exist, the one closest to the window start wins; a run longer than `run`
/// still resolves at its `run`-th frame.
pub fn first_run_forward(mask: &[bool], run: usize) -> Option<usize> {
    if run == 0 {
        return None;
    }

    let mut consecutive = 0;
    for (index, &valid) in mask.iter().enumerate() {
        if valid {
            consecutive += 1;
            if consecutive >= run {
                return Some(index);
            }
        } else {
            consecutive = 0;
        }
    }
    None
}

/// Backward scan for the first run of `run` consecutive `true` entries.
///
/// Iterating backward finds the run closest to the window's own end; the
/// returned index is the first (lowest) index of that confirming run.
pub fn first_run_backward(mask: &[bool], run: usize) -> Option<usize> {
    if run == 0 {
        return None;
    }

    let mut consecutive = 0;
    for (index, &valid) in mask.iter().enumerate().rev() {
        if valid {
            consecutive += 1;
            if consecutive >= run {
                return Some(index);
            }
        } else {
            consecutive = 0;
        }
    }
    None
}

/// Resolve the programme start from the start-window frames.
///
/// The boundary sits at the end of the confirming run, deliberately cutting
/// slightly into the blank region rather than risking programme content.
pub fn resolve_start(frames: &[Frame], silences: &[SilencePeriod], frame_rate: f64) -> Option<f64> {
    let mask = build_validity_mask(frames, silences, SIMILARITY_THRESHOLD, SILENCE_TOLERANCE_MS);
    first_run_forward(&mask, REQUIRED_RUN).map(|index| index as f64 / frame_rate)
}

/// Resolve the programme end from the end-window frames.
///
/// `window_offset_secs` is the end window's absolute start offset
/// (duration − window length, clamped to 0 for short files).
pub fn resolve_end(
    frames: &[Frame],
    silences: &[SilencePeriod],
    window_offset_secs: f64,
    frame_rate: f64,
) -> Option<f64> {
    let mask = build_validity_mask(frames, silences, SIMILARITY_THRESHOLD, SILENCE_TOLERANCE_MS);
    first_run_backward(&mask, REQUIRED_RUN)
        .map(|index| window_offset_secs + index as f64 / frame_rate)
}
