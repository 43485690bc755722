#![deny(unreachable_patterns)]
//! Programme boundary detection for raw broadcast recordings.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a blocking-per-task runner
//! - Duration probing from FFmpeg's diagnostic output
//! - Candidate frame extraction, PNG stream demultiplexing and bounded
//!   concurrent similarity scoring against a blank reference image
//! - Silence detection and loudness sampling on the broadcast audio track
//! - Fusion of both signals into per-frame validity and resolution of the
//!   programme start/end trim points
//! - Trim application via FFmpeg re-encode

pub mod command;
pub mod demux;
pub mod detect;
pub mod error;
pub mod extract;
pub mod frame;
pub mod levels;
pub mod probe;
pub mod resolve;
pub mod score;
pub mod silence;
pub mod trim;

pub use command::{check_ffmpeg, check_magick, FfmpegCommand, FfmpegRunner};
pub use detect::{detect_boundaries, DetectOptions};
pub use error::{MediaError, MediaResult};
pub use frame::{Frame, FRAME_RATE};
pub use probe::probe_duration;
pub use trim::trim_recording;
