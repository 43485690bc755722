//! Candidate frame extraction.
//!
//! One FFmpeg invocation per window: mask the station logo region on both the
//! source window and the looped reference image, convert both to grayscale,
//! blend as an absolute per-pixel difference, resample to the detection frame
//! rate, and stream the result as concatenated PNGs on stdout. A blank source
//! frame therefore produces a near-black difference image (mean ≈ 0,
//! similarity ≈ 1).

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Region blacked out on both source and reference before differencing.
/// Covers the station DOG in the top-right corner of the 1080p raster.
#[derive(Debug, Clone, Copy)]
pub struct LogoMask {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for LogoMask {
    fn default() -> Self {
        Self {
            x: 1560,
            y: 40,
            width: 300,
            height: 120,
        }
    }
}

impl LogoMask {
    fn drawbox(&self) -> String {
        format!(
            "drawbox=x={}:y={}:w={}:h={}:color=black:t=fill",
            self.x, self.y, self.width, self.height
        )
    }
}

/// One of the two scanned time ranges.
#[derive(Debug, Clone, Copy)]
pub struct FrameWindow {
    /// Window label, used for debug artifact locations ("start" / "end").
    pub label: &'static str,
    /// Absolute window start offset in seconds (≥ 0).
    pub offset_secs: f64,
    /// Window length in seconds.
    pub length_secs: f64,
}

impl FrameWindow {
    /// Absolute window start offset in rounded milliseconds.
    pub fn offset_ms(&self) -> u64 {
        (self.offset_secs * 1000.0).round() as u64
    }
}

/// Build the mask/difference filter graph shared by both extraction modes.
///
/// Input 0 is the recording window, input 1 the looped reference image
/// (rescaled onto the source raster first). Output pad is `[out]`.
pub fn build_diff_filter(mask: &LogoMask, frame_rate: f64) -> String {
    let drawbox = mask.drawbox();
    format!(
        "[1:v][0:v]scale2ref[ref][src];\
         [src]{drawbox},format=gray[srcg];\
         [ref]{drawbox},format=gray[refg];\
         [srcg][refg]blend=all_mode=difference:shortest=1,fps={frame_rate}[out]"
    )
}

/// Extract a window as one in-memory concatenated PNG stream.
///
/// Frame ordering matches presentation order: earliest-first for both
/// windows. "First" in the end window means closest to the window start, not
/// closest to the file end.
pub async fn extract_window_stream(
    input: impl AsRef<Path>,
    reference: impl AsRef<Path>,
    window: &FrameWindow,
    filter: &str,
) -> MediaResult<Vec<u8>> {
    let input = input.as_ref();

    let cmd = FfmpegCommand::new()
        .seek(window.offset_secs)
        .duration(window.length_secs)
        .input(input)
        .loop_image(reference.as_ref())
        .filter_complex(filter)
        .map("[out]")
        .video_codec("png")
        .format("image2pipe")
        .log_level("error")
        .output_stdout();

    let stream = FfmpegRunner::new().run_capture_stdout(&cmd).await?;

    debug!(
        window = window.label,
        offset_secs = window.offset_secs,
        bytes = stream.len(),
        "Extracted frame stream"
    );

    Ok(stream)
}

/// Directory debug-retained frames for `label` are written to.
pub fn debug_frames_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("boxcut-frames-{label}"))
}

/// Debug-retention extraction: discrete full-resolution PNG files instead of
/// a pipe, written to [`debug_frames_dir`] and left there for inspection.
///
/// Returns the frame buffers read back in index order, so downstream scoring
/// is identical to the streamed path.
pub async fn extract_window_files(
    input: impl AsRef<Path>,
    reference: impl AsRef<Path>,
    window: &FrameWindow,
    filter: &str,
) -> MediaResult<Vec<Vec<u8>>> {
    let dir = debug_frames_dir(window.label);
    tokio::fs::create_dir_all(&dir).await?;

    let cmd = FfmpegCommand::new()
        .seek(window.offset_secs)
        .duration(window.length_secs)
        .input(input.as_ref())
        .loop_image(reference.as_ref())
        .filter_complex(filter)
        .map("[out]")
        .video_codec("png")
        .format("image2")
        .log_level("error")
        .output_file(dir.join("frame-%05d.png"));

    FfmpegRunner::new().run(&cmd).await?;

    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "png") {
            paths.push(path);
        }
    }
    // FFmpeg numbers the files sequentially; name order is index order.
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        frames.push(tokio::fs::read(path).await?);
    }

    debug!(
        window = window.label,
        frames = frames.len(),
        dir = %dir.display(),
        "Extracted and retained debug frames"
    );

    Ok(frames)
}
