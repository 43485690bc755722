//! Silence detection on the broadcast audio track.

use regex::Regex;
use std::path::Path;
use tracing::debug;

use boxcut_models::SilencePeriod;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Silence threshold handed to the detector filter.
pub const SILENCE_NOISE: &str = "-80dB";
/// Minimum silence duration in seconds.
pub const SILENCE_MIN_DURATION_SECS: f64 = 1.0;
/// Audio stream the detector listens to. Stream 0 carries an alternate
/// commentary track on this broadcast source, so the second stream is
/// authoritative. Not auto-detected; no fallback when absent.
pub const SILENCE_STREAM_INDEX: u32 = 1;

/// Detect silent intervals across the whole recording.
///
/// Runs FFmpeg `silencedetect` against audio stream
/// [`SILENCE_STREAM_INDEX`] and parses the emitted interval boundaries. A
/// non-zero exit (commonly: the stream does not exist) is fatal for the file
/// and propagated as-is.
pub async fn detect_silence(path: impl AsRef<Path>) -> MediaResult<Vec<SilencePeriod>> {
    let path = path.as_ref();

    let cmd = FfmpegCommand::new()
        .input(path)
        .map(format!("0:a:{SILENCE_STREAM_INDEX}"))
        .audio_filter(format!(
            "silencedetect=noise={SILENCE_NOISE}:d={SILENCE_MIN_DURATION_SECS}"
        ))
        .output_null();

    let stderr = FfmpegRunner::new().run_capture_stderr(&cmd).await?;
    let periods = parse_silence(&stderr);

    debug!(
        path = %path.display(),
        periods = periods.len(),
        "Silence detection complete"
    );

    Ok(periods)
}

/// Parse `silence_end: <t> | silence_duration: <d>` lines (seconds) into
/// millisecond periods, reconstructing each start as end − duration.
fn parse_silence(stderr: &str) -> Vec<SilencePeriod> {
    let pattern = Regex::new(
        r"silence_end:\s*(\d+(?:\.\d+)?)\s*\|\s*silence_duration:\s*(\d+(?:\.\d+)?)",
    )
    .expect("silence pattern is valid");

    stderr
        .lines()
        .filter_map(|line| pattern.captures(line))
        .filter_map(|caps| {
            let end: f64 = caps[1].parse().ok()?;
            let duration: f64 = caps[2].parse().ok()?;
            let start = (end - duration).max(0.0);
            Some(SilencePeriod {
                start_ms: (start * 1000.0).round() as u64,
                end_ms: (end * 1000.0).round() as u64,
            })
        })
        .collect()
}
