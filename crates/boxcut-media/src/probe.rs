//! Media duration probing.

use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Probe a recording for its total duration in seconds.
///
/// Runs FFmpeg over the whole file with a null sink and parses the
/// `Duration: HH:MM:SS.ff` report from its diagnostic output. The first match
/// wins. There is no retry; a missing pattern is [`MediaError::DurationParse`].
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    let cmd = FfmpegCommand::new()
        .input(path)
        .output_arg("-c")
        .output_arg("copy")
        .output_null();

    let stderr = FfmpegRunner::new().run_capture_stderr(&cmd).await?;
    let duration = parse_duration(&stderr)?;

    debug!(
        path = %path.display(),
        duration_secs = duration,
        "Probed recording duration"
    );

    Ok(duration)
}

/// Parse the first `Duration: HH:MM:SS.ff` report out of FFmpeg stderr.
fn parse_duration(stderr: &str) -> MediaResult<f64> {
    let pattern = Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)")
        .expect("duration pattern is valid");

    let caps = pattern
        .captures(stderr)
        .ok_or_else(|| MediaError::DurationParse(stderr.to_string()))?;

    let hours: f64 = caps[1].parse().unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}
