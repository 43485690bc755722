//! Frame similarity scoring.
//!
//! Each demuxed frame is piped to ImageMagick on stdin, which reports the
//! arithmetic mean grayscale intensity of the difference image in [0, 1].
//! Scoring runs on a fixed-size worker pool: workers pull indices from a
//! shared cursor and results land positionally in a preallocated array, so
//! out-of-order completion under concurrency never corrupts alignment.

use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::check_magick;
use crate::error::{MediaError, MediaResult};
use crate::frame::FAILED_FRAME_MEAN;

/// Default number of concurrent scoring processes per window.
pub const DEFAULT_PARALLELISM: usize = 8;

/// Score every frame buffer, preserving input order.
///
/// At most `parallelism` collaborator processes are in flight at once. A
/// per-frame failure (spawn error, non-zero exit, non-numeric output) records
/// [`FAILED_FRAME_MEAN`] for that index and the batch continues; only a
/// missing ImageMagick binary fails the whole call. Returns once every frame
/// has completed or failed.
pub async fn score_frames(frames: Vec<Vec<u8>>, parallelism: usize) -> MediaResult<Vec<f64>> {
    if frames.is_empty() {
        return Ok(Vec::new());
    }
    check_magick()?;

    let total = frames.len();
    let frames = Arc::new(frames);
    let cursor = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, f64)>();

    let worker_count = parallelism.clamp(1, total);
    debug!(total, workers = worker_count, "Scoring frame batch");

    let workers: Vec<_> = (0..worker_count)
        .map(|_| {
            let frames = Arc::clone(&frames);
            let cursor = Arc::clone(&cursor);
            let tx = tx.clone();
            tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= frames.len() {
                        break;
                    }
                    let mean = match mean_intensity(&frames[index]).await {
                        Ok(mean) => mean,
                        Err(e) => {
                            warn!(index, error = %e, "Frame scoring failed, frame will never read as blank");
                            FAILED_FRAME_MEAN
                        }
                    };
                    if tx.send((index, mean)).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    drop(tx);

    // Positional writes; completion order is irrelevant.
    let mut means = vec![FAILED_FRAME_MEAN; total];
    while let Some((index, mean)) = rx.recv().await {
        means[index] = mean;
    }

    for worker in workers {
        let _ = worker.await;
    }

    Ok(means)
}

/// Ask ImageMagick for the mean grayscale intensity of one image.
async fn mean_intensity(frame: &[u8]) -> MediaResult<f64> {
    let mut child = Command::new("magick")
        .args(["png:-", "-colorspace", "gray", "-format", "%[fx:mean]", "info:"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            MediaError::tool_failed("magick", format!("failed to start: {e}"), None, None)
        })?;

    let mut stdin = child.stdin.take().expect("stdin requested as piped");
    stdin.write_all(frame).await?;
    drop(stdin);

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(MediaError::tool_failed(
            "magick",
            "exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    parse_mean(&text).ok_or_else(|| {
        MediaError::tool_failed(
            "magick",
            format!("non-numeric mean output: {:?}", text.trim()),
            None,
            None,
        )
    })
}

/// Parse the collaborator's mean report: one standard-float string.
fn parse_mean(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mean() {
        assert_eq!(parse_mean("0.0312964\n"), Some(0.0312964));
        assert_eq!(parse_mean(" 1 "), Some(1.0));
        assert_eq!(parse_mean("0"), Some(0.0));
        assert_eq!(parse_mean(""), None);
        assert_eq!(parse_mean("not-a-number"), None);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_collaborator() {
        // Must not touch PATH lookup for an empty input
        let means = score_frames(Vec::new(), DEFAULT_PARALLELISM).await.unwrap();
        assert!(means.is_empty());
    }
}
