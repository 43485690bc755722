//! Shared data models for boxcut.
//!
//! This crate provides Serde-serializable types for:
//! - Boundary detection results and the audio signals they are fused from
//! - Episode metadata resolved from the remote database
//! - Encoding configuration for trim application
//! - Timestamp parsing and formatting

pub mod boundary;
pub mod encoding;
pub mod episode;
pub mod timestamp;

// Re-export common types
pub use boundary::{
    any_silence_at, level_at, silence_at, AudioLevelSample, BoundaryResult, SilencePeriod,
};
pub use encoding::EncodingConfig;
pub use episode::{Episode, RecordingName, ShowRecord};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
