//! Trim application.

use std::path::Path;
use tracing::info;

use boxcut_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Re-encode `input` between the resolved boundaries into `output`.
///
/// Seeking happens before the input for fast keyframe-aligned entry; the
/// sub-second inaccuracy that buys is within the detector's own precision.
pub async fn trim_recording(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start_secs: f64,
    end_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if end_secs <= start_secs {
        return Err(MediaError::tool_failed(
            "ffmpeg",
            format!("refusing empty trim range {start_secs:.3}..{end_secs:.3}"),
            None,
            None,
        ));
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        start_secs,
        end_secs,
        "Trimming recording"
    );

    let cmd = FfmpegCommand::new()
        .seek(start_secs)
        .duration(end_secs - start_secs)
        .input(input)
        .output_args(encoding.to_ffmpeg_args())
        .log_level("error")
        .output_file(output);

    FfmpegRunner::new().run(&cmd).await?;

    info!(output = %output.display(), "Trim complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_empty_range() {
        let err = trim_recording(
            "in.ts",
            "out.mp4",
            100.0,
            100.0,
            &EncodingConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::ToolFailed { .. }));
    }
}
