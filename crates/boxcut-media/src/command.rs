//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Where FFmpeg writes its primary output.
#[derive(Debug, Clone)]
enum Sink {
    /// Regular output file.
    File(PathBuf),
    /// Raw bytes on standard output (`pipe:1`).
    Stdout,
    /// Discard output (`-f null -`); only the diagnostic stream matters.
    Null,
}

/// Builder for FFmpeg invocations.
///
/// Arguments are kept in input order: per-input flags (`-ss`, `-t`, `-loop`)
/// must be pushed before the `-i` they apply to, which the builder methods do.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input arguments, including the `-i` entries themselves
    input_args: Vec<String>,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
    /// Output target
    sink: Sink,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl Default for FfmpegCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with no inputs and a null sink.
    pub fn new() -> Self {
        Self {
            input_args: Vec::new(),
            output_args: Vec::new(),
            sink: Sink::Null,
            overwrite: true,
            log_level: "info".to_string(),
        }
    }

    /// Set seek position for the next input.
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Set read duration for the next input.
    pub fn duration(self, seconds: f64) -> Self {
        self.input_arg("-t").input_arg(format!("{:.3}", seconds))
    }

    /// Add an input file.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        self.input_arg("-i").input_arg(path)
    }

    /// Add a still image input, looped so it pairs with a video stream.
    pub fn loop_image(self, path: impl AsRef<Path>) -> Self {
        self.input_arg("-loop").input_arg("1").input(path)
    }

    /// Add a raw input argument.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add a raw output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Select an output stream.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Set output container format.
    pub fn format(self, fmt: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(fmt)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Disable audio in the output.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Write output to a file.
    pub fn output_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sink = Sink::File(path.as_ref().to_path_buf());
        self
    }

    /// Write raw output bytes to stdout.
    pub fn output_stdout(mut self) -> Self {
        self.sink = Sink::Stdout;
        self
    }

    /// Discard output entirely; run for the diagnostic stream only.
    pub fn output_null(mut self) -> Self {
        self.sink = Sink::Null;
        self
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the full argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string()];

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());
        args.extend(self.output_args.clone());

        match &self.sink {
            Sink::File(path) => args.push(path.to_string_lossy().to_string()),
            Sink::Stdout => args.push("pipe:1".to_string()),
            Sink::Null => {
                args.push("-f".to_string());
                args.push("null".to_string());
                args.push("-".to_string());
            }
        }

        args
    }
}

/// Runner for FFmpeg commands.
///
/// Every variant blocks the calling task until the process exits; there is no
/// cancellation and no timeout. A process that cannot be started or exits
/// non-zero surfaces as [`MediaError::ToolFailed`].
#[derive(Debug, Default)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }

    /// Run to completion, discarding both output streams on success.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.output_of(cmd).await.map(|_| ())
    }

    /// Run to completion and return the diagnostic (stderr) text.
    pub async fn run_capture_stderr(&self, cmd: &FfmpegCommand) -> MediaResult<String> {
        let output = self.output_of(cmd).await?;
        Ok(String::from_utf8_lossy(&output.stderr).to_string())
    }

    /// Run to completion and return the raw stdout bytes.
    pub async fn run_capture_stdout(&self, cmd: &FfmpegCommand) -> MediaResult<Vec<u8>> {
        let output = self.output_of(cmd).await?;
        Ok(output.stdout)
    }

    async fn output_of(&self, cmd: &FfmpegCommand) -> MediaResult<std::process::Output> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::tool_failed("ffmpeg", format!("failed to start: {e}"), None, None)
            })?;

        if !output.status.success() {
            return Err(MediaError::tool_failed(
                "ffmpeg",
                "exited with non-zero status",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
                output.status.code(),
            ));
        }

        Ok(output)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if ImageMagick is available.
pub fn check_magick() -> MediaResult<PathBuf> {
    which::which("magick").map_err(|_| MediaError::MagickNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_input_order() {
        let cmd = FfmpegCommand::new()
            .seek(120.0)
            .duration(300.0)
            .input("recording.ts")
            .loop_image("reference.png")
            .filter_complex("[0:v][1:v]blend=all_mode=difference")
            .map("[out]")
            .output_stdout();

        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        let looped = args.iter().position(|a| a == "-loop").unwrap();

        assert!(ss < first_i, "seek must precede its input");
        assert!(first_i < looped, "reference input comes second");
        assert_eq!(args.last().unwrap(), "pipe:1");
        assert!(args.contains(&"120.000".to_string()));
    }

    #[test]
    fn test_null_sink_args() {
        let cmd = FfmpegCommand::new()
            .input("recording.ts")
            .audio_filter("silencedetect=noise=-80dB:d=1")
            .output_null();

        let args = cmd.build_args();
        let n = args.len();
        assert_eq!(&args[n - 3..], &["-f", "null", "-"]);
    }

    #[test]
    fn test_overwrite_and_log_level() {
        let args = FfmpegCommand::new()
            .input("a.ts")
            .log_level("error")
            .output_file("out.mp4")
            .build_args();

        assert!(args.contains(&"-y".to_string()));
        assert!(args.contains(&"error".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }
}
