//! Programme boundary detection entry point.
//!
//! Orchestration per run: probe duration once, then run silence detection,
//! level sampling, and the two window pipelines (extract → demux → score)
//! concurrently, then fuse and resolve each side independently. All true
//! parallelism lives in the external processes; this module only awaits them.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use boxcut_models::{level_at, silence_at, AudioLevelSample, BoundaryResult, SilencePeriod};

use crate::command::{check_ffmpeg, check_magick};
use crate::demux::split_frames;
use crate::error::MediaResult;
use crate::extract::{
    build_diff_filter, debug_frames_dir, extract_window_files, extract_window_stream, FrameWindow,
    LogoMask,
};
use crate::frame::{Frame, FRAME_RATE};
use crate::levels::sample_levels;
use crate::probe::probe_duration;
use crate::resolve::{resolve_end, resolve_start, SILENCE_TOLERANCE_MS, SIMILARITY_THRESHOLD};
use crate::score::{score_frames, DEFAULT_PARALLELISM};
use crate::silence::detect_silence;

/// Default length of the scanned window at the recording start.
pub const DEFAULT_START_WINDOW_SECS: f64 = 300.0;
/// Default length of the scanned window at the recording end.
pub const DEFAULT_END_WINDOW_SECS: f64 = 600.0;

/// Tunables for one detection run.
///
/// Similarity threshold and frame rate are fixed internally
/// ([`SIMILARITY_THRESHOLD`], [`FRAME_RATE`]).
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Blank/idle reference image the frames are differenced against.
    pub reference: PathBuf,
    /// Length of the window scanned from the recording start, seconds.
    pub start_window_secs: f64,
    /// Length of the window scanned up to the recording end, seconds.
    pub end_window_secs: f64,
    /// Scorer worker pool size, per window.
    pub parallelism: usize,
    /// Retain extracted frames and write per-frame diagnostics.
    pub keep_frames: bool,
}

impl DetectOptions {
    /// Options with defaults for everything but the reference image.
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            start_window_secs: DEFAULT_START_WINDOW_SECS,
            end_window_secs: DEFAULT_END_WINDOW_SECS,
            parallelism: DEFAULT_PARALLELISM,
            keep_frames: false,
        }
    }
}

/// Detect the programme boundaries of one recording.
///
/// Each window owns its own scorer pool, so with both windows in flight up to
/// 2 × `parallelism` scoring processes run concurrently; size host capacity
/// accordingly. There is no cancellation: a fatal error in one window does
/// not abort the other, but the call fails once any required signal is
/// unavailable. Unresolved sides are not errors; they come back as `None`
/// with an explanatory note.
pub async fn detect_boundaries(
    path: impl AsRef<Path>,
    opts: &DetectOptions,
) -> MediaResult<BoundaryResult> {
    let path = path.as_ref();
    check_ffmpeg()?;
    check_magick()?;

    let duration = probe_duration(path).await?;
    let end_offset_secs = end_window_offset(duration, opts.end_window_secs);

    let start_window = FrameWindow {
        label: "start",
        offset_secs: 0.0,
        length_secs: opts.start_window_secs,
    };
    let end_window = FrameWindow {
        label: "end",
        offset_secs: end_offset_secs,
        length_secs: opts.end_window_secs,
    };

    let filter = build_diff_filter(&LogoMask::default(), FRAME_RATE);

    let (silences, levels, start_frames, end_frames) = tokio::join!(
        detect_silence(path),
        sample_levels(path),
        window_frames(path, opts, &start_window, &filter),
        window_frames(path, opts, &end_window, &filter),
    );
    let silences = silences?;
    let levels = levels?;
    let start_frames = start_frames?;
    let end_frames = end_frames?;

    let result = assemble_result(
        resolve_start(&start_frames, &silences, FRAME_RATE),
        resolve_end(&end_frames, &silences, end_offset_secs, FRAME_RATE),
    );

    if opts.keep_frames {
        write_frame_report(&start_window, &start_frames, &silences, &levels).await?;
        write_frame_report(&end_window, &end_frames, &silences, &levels).await?;
    }

    info!(
        path = %path.display(),
        duration_secs = duration,
        program_start = ?result.program_start,
        program_end = ?result.program_end,
        "Boundary detection complete"
    );

    Ok(result)
}

/// Absolute start offset of the end window. Files shorter than the window
/// clamp to 0; the resulting overlap with the start window is accepted.
fn end_window_offset(duration_secs: f64, end_window_secs: f64) -> f64 {
    (duration_secs - end_window_secs).max(0.0)
}

/// Combine the two independently resolved sides, noting each unresolved one.
fn assemble_result(program_start: Option<f64>, program_end: Option<f64>) -> BoundaryResult {
    let mut notes = Vec::new();
    if program_start.is_none() {
        notes.push("No valid black period found at start".to_string());
    }
    if program_end.is_none() {
        notes.push("No valid black period found at end".to_string());
    }

    BoundaryResult {
        program_start,
        program_end,
        notes,
    }
}

/// One window pipeline: extract → demux → score → frames.
async fn window_frames(
    path: &Path,
    opts: &DetectOptions,
    window: &FrameWindow,
    filter: &str,
) -> MediaResult<Vec<Frame>> {
    let buffers = if opts.keep_frames {
        extract_window_files(path, &opts.reference, window, filter).await?
    } else {
        let stream = extract_window_stream(path, &opts.reference, window, filter).await?;
        split_frames(&stream)
    };

    if buffers.is_empty() {
        warn!(window = window.label, "Window produced no frames");
    }

    let means = score_frames(buffers, opts.parallelism).await?;
    Ok(frames_from_means(&means, window))
}

/// Attach indices and absolute timestamps to a window's scored means.
fn frames_from_means(means: &[f64], window: &FrameWindow) -> Vec<Frame> {
    means
        .iter()
        .enumerate()
        .map(|(index, &mean)| Frame::new(index, mean, FRAME_RATE, window.offset_ms()))
        .collect()
}

/// Write the per-frame diagnostic report for one window.
async fn write_frame_report(
    window: &FrameWindow,
    frames: &[Frame],
    silences: &[SilencePeriod],
    levels: &[AudioLevelSample],
) -> MediaResult<()> {
    let dir = debug_frames_dir(window.label);
    tokio::fs::create_dir_all(&dir).await?;

    let report = frame_report(frames, silences, levels);
    tokio::fs::write(dir.join("frames.txt"), report).await?;
    Ok(())
}

/// One line per frame: index, timestamp, mean, similarity, the three flags,
/// the matched silence interval and the nearest loudness sample.
fn frame_report(
    frames: &[Frame],
    silences: &[SilencePeriod],
    levels: &[AudioLevelSample],
) -> String {
    let mut out = String::new();

    for frame in frames {
        let black = frame.similarity() >= SIMILARITY_THRESHOLD;
        let matched = silence_at(silences, frame.timestamp_ms, SILENCE_TOLERANCE_MS);
        let valid = black && matched.is_some();

        let silence = matched
            .map(|p| format!("{}..{}ms", p.start_ms, p.end_ms))
            .unwrap_or_else(|| "-".to_string());
        let level = level_at(levels, frame.timestamp_ms as f64 / 1000.0)
            .map(|s| format!("{:.1}dB", s.mean_db))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "index={} t_ms={} mean={:.4} similarity={:.4} black={} silent={} valid={} silence={} level={}\n",
            frame.index,
            frame.timestamp_ms,
            frame.mean_intensity,
            frame.similarity(),
            black,
            matched.is_some(),
            valid,
            silence,
            level,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_window_offset_clamps_short_files() {
        assert_eq!(end_window_offset(2096.78, 600.0), 1496.78);
        assert_eq!(end_window_offset(300.0, 600.0), 0.0);
    }

    #[test]
    fn test_frames_from_means_are_positional() {
        let window = FrameWindow {
            label: "start",
            offset_secs: 0.0,
            length_secs: 300.0,
        };
        let frames = frames_from_means(&[0.1, 0.9, 0.5], &window);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].index, 1);
        assert_eq!(frames[1].mean_intensity, 0.9);
        assert_eq!(frames[2].timestamp_ms, 400);
    }

    #[test]
    fn test_frames_from_means_apply_window_offset() {
        let window = FrameWindow {
            label: "end",
            offset_secs: 1496.78,
            length_secs: 600.0,
        };
        let frames = frames_from_means(&[0.5], &window);
        assert_eq!(frames[0].timestamp_ms, 1_496_780);
    }

    #[test]
    fn test_frame_report_flags() {
        let window = FrameWindow {
            label: "start",
            offset_secs: 0.0,
            length_secs: 300.0,
        };
        // Frame 0 (t=0) blank+silent, frame 1 (t=200ms) non-blank,
        // frame 2 (t=400ms) blank but outside silence even with tolerance
        let frames = frames_from_means(&[0.02, 0.50, 0.03], &window);
        let silences = vec![SilencePeriod {
            start_ms: 0,
            end_ms: 100,
        }];
        let levels = vec![AudioLevelSample {
            timestamp_secs: 0.0,
            mean_db: -80.0,
        }];

        let report = frame_report(&frames, &silences, &levels);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("valid=true"));
        assert!(lines[0].contains("silence=0..100ms"));
        assert!(lines[0].contains("level=-80.0dB"));
        assert!(lines[1].contains("black=false"));
        assert!(lines[1].contains("valid=false"));
        assert!(lines[2].contains("black=true"));
        assert!(lines[2].contains("silent=false"));
        assert!(lines[2].contains("silence=-"));
    }

    #[test]
    fn test_unresolved_sides_get_exactly_one_note_each() {
        let both = assemble_result(Some(120.0), Some(1800.0));
        assert!(both.notes.is_empty());

        let no_start = assemble_result(None, Some(1800.0));
        assert_eq!(no_start.notes, vec!["No valid black period found at start"]);

        let no_end = assemble_result(Some(120.0), None);
        assert_eq!(no_end.notes, vec!["No valid black period found at end"]);

        let neither = assemble_result(None, None);
        assert_eq!(neither.notes.len(), 2);
    }

    #[test]
    fn test_default_options() {
        let opts = DetectOptions::new("reference.png");
        assert_eq!(opts.start_window_secs, DEFAULT_START_WINDOW_SECS);
        assert_eq!(opts.end_window_secs, DEFAULT_END_WINDOW_SECS);
        assert!(!opts.keep_frames);
        assert_eq!(opts.parallelism, DEFAULT_PARALLELISM);
    }
}
