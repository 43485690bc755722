//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external collaborators.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ImageMagick not found in PATH")]
    MagickNotFound,

    #[error("{tool} failed: {message}")]
    ToolFailed {
        tool: &'static str,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("no duration found in probe output")]
    DurationParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a collaborator failure error.
    pub fn tool_failed(
        tool: &'static str,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool,
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}
