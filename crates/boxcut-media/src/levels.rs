//! Periodic audio loudness sampling.
//!
//! Auxiliary signal: the samples only annotate debug output, they are not on
//! the detection success path. The collaborator is still audio-track-bound,
//! so it fails exactly when silence detection does.

use regex::Regex;
use std::path::Path;
use tracing::debug;

use boxcut_models::AudioLevelSample;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::silence::SILENCE_STREAM_INDEX;

/// Sample RMS loudness across the whole recording.
///
/// FFmpeg `astats` resets its running statistic every reporting frame and the
/// metadata printer emits a timestamp marker line followed by an RMS level
/// marker line for each frame.
pub async fn sample_levels(path: impl AsRef<Path>) -> MediaResult<Vec<AudioLevelSample>> {
    let path = path.as_ref();

    let cmd = FfmpegCommand::new()
        .input(path)
        .map(format!("0:a:{SILENCE_STREAM_INDEX}"))
        .audio_filter(
            "astats=metadata=1:reset=1,ametadata=print:key=lavfi.astats.Overall.RMS_level",
        )
        .output_null();

    let stderr = FfmpegRunner::new().run_capture_stderr(&cmd).await?;
    let samples = parse_levels(&stderr);

    debug!(
        path = %path.display(),
        samples = samples.len(),
        "Audio level sampling complete"
    );

    Ok(samples)
}

/// Pair `pts_time:` and `RMS_level=` marker lines by most recent unconsumed
/// timestamp.
fn parse_levels(stderr: &str) -> Vec<AudioLevelSample> {
    let time_pattern =
        Regex::new(r"pts_time:\s*(-?\d+(?:\.\d+)?)").expect("pts_time pattern is valid");
    let level_pattern = Regex::new(r"lavfi\.astats\.Overall\.RMS_level=(-?(?:\d+(?:\.\d+)?|inf))")
        .expect("RMS pattern is valid");

    let mut samples = Vec::new();
    let mut pending_time: Option<f64> = None;

    for line in stderr.lines() {
        if let Some(caps) = time_pattern.captures(line) {
            pending_time = caps[1].parse().ok();
        } else if let Some(caps) = level_pattern.captures(line) {
            if let Some(timestamp_secs) = pending_time.take() {
                let mean_db = match &caps[1] {
                    "-inf" => f64::NEG_INFINITY,
                    value => match value.parse() {
                        Ok(db) => db,
                        Err(_) => continue,
                    },
                };
                samples.push(AudioLevelSample {
                    timestamp_secs,
                    mean_db,
                });
            }
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS_STDERR: &str = "\
[Parsed_ametadata_1 @ 0x560] frame:0    pts:0       pts_time:0
[Parsed_ametadata_1 @ 0x560] lavfi.astats.Overall.RMS_level=-inf
[Parsed_ametadata_1 @ 0x560] frame:1    pts:48000   pts_time:1.000
[Parsed_ametadata_1 @ 0x560] lavfi.astats.Overall.RMS_level=-42.431287
[Parsed_ametadata_1 @ 0x560] frame:2    pts:96000   pts_time:2.000
[Parsed_ametadata_1 @ 0x560] lavfi.astats.Overall.RMS_level=-18.04
size=N/A time=00:34:56.78 bitrate=N/A speed= 388x
";

    #[test]
    fn test_parse_levels_pairs_in_order() {
        let samples = parse_levels(LEVELS_STDERR);
        assert_eq!(samples.len(), 3);

        assert_eq!(samples[0].timestamp_secs, 0.0);
        assert!(samples[0].mean_db.is_infinite() && samples[0].mean_db < 0.0);

        assert_eq!(samples[1].timestamp_secs, 1.0);
        assert!((samples[1].mean_db - (-42.431287)).abs() < 1e-9);

        assert_eq!(samples[2].timestamp_secs, 2.0);
    }

    #[test]
    fn test_rms_without_timestamp_is_dropped() {
        let samples = parse_levels("lavfi.astats.Overall.RMS_level=-20.0");
        assert!(samples.is_empty());
    }

    #[test]
    fn test_timestamp_consumed_once() {
        let text = "\
pts_time:5.0
lavfi.astats.Overall.RMS_level=-30.0
lavfi.astats.Overall.RMS_level=-31.0
";
        let samples = parse_levels(text);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].timestamp_secs, 5.0);
        assert_eq!(samples[0].mean_db, -30.0);
    }
}
