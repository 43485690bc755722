//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use boxcut_media::detect::{DetectOptions, DEFAULT_END_WINDOW_SECS, DEFAULT_START_WINDOW_SECS};
use boxcut_media::score::DEFAULT_PARALLELISM;

/// Trim station idents, black frames and silence off broadcast recordings.
#[derive(Debug, Parser)]
#[command(name = "boxcut", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect the programme boundaries of a single recording
    Detect {
        /// Recording file
        file: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Print machine-readable JSON instead of a console report
        #[arg(long)]
        json: bool,
    },

    /// Scan a directory of recordings and detect (optionally trim) each
    Scan {
        /// Directory containing recordings
        dir: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Trim each resolved recording into `<stem>.cut.mp4`
        #[arg(long)]
        apply: bool,

        /// Delete the original after a successful trim
        #[arg(long, requires = "apply")]
        delete_original: bool,

        /// Annotate reports with episode metadata from the remote database
        #[arg(long)]
        lookup: bool,

        /// Print machine-readable JSON instead of a console report
        #[arg(long)]
        json: bool,
    },

    /// Trim a recording between explicit timestamps
    Trim {
        /// Recording file
        file: PathBuf,

        /// Trim start (HH:MM:SS, MM:SS or SS)
        #[arg(long)]
        start: String,

        /// Trim end (HH:MM:SS, MM:SS or SS)
        #[arg(long)]
        end: String,

        /// Output path (defaults to `<stem>.cut.mp4` beside the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Detection tunables shared by `detect` and `scan`.
#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Blank/idle reference image
    #[arg(long, default_value = "reference.png")]
    pub reference: PathBuf,

    /// Length of the scanned window at the recording start, in seconds
    #[arg(long, default_value_t = DEFAULT_START_WINDOW_SECS)]
    pub start_window: f64,

    /// Length of the scanned window at the recording end, in seconds
    #[arg(long, default_value_t = DEFAULT_END_WINDOW_SECS)]
    pub end_window: f64,

    /// Concurrent scoring processes per window
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub jobs: usize,

    /// Retain extracted frames and write per-frame diagnostics
    #[arg(long)]
    pub keep_frames: bool,
}

impl DetectArgs {
    pub fn to_options(&self) -> DetectOptions {
        DetectOptions {
            reference: self.reference.clone(),
            start_window_secs: self.start_window,
            end_window_secs: self.end_window,
            parallelism: self.jobs,
            keep_frames: self.keep_frames,
        }
    }
}
