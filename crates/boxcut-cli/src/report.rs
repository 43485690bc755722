//! Console and JSON result reporting.

use std::path::Path;

use serde::Serialize;

use boxcut_models::{format_seconds, BoundaryResult, Episode};

/// Machine-readable shape of one per-file report.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub file: String,
    pub program_start: Option<f64>,
    pub program_end: Option<f64>,
    pub notes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<&'a Episode>,
}

impl<'a> Report<'a> {
    pub fn new(file: &Path, result: &'a BoundaryResult, episode: Option<&'a Episode>) -> Self {
        Self {
            file: file.display().to_string(),
            program_start: result.program_start,
            program_end: result.program_end,
            notes: &result.notes,
            episode,
        }
    }
}

/// Print one file's outcome.
pub fn print_result(file: &Path, result: &BoundaryResult, episode: Option<&Episode>, json: bool) {
    if json {
        let report = Report::new(file, result, episode);
        // Serialization of this shape cannot fail
        println!("{}", serde_json::to_string(&report).expect("report serializes"));
        return;
    }

    println!("{}", file.display());
    if let Some(episode) = episode {
        println!("  episode: {} {}", episode.code(), episode.name);
    }
    println!("  start:   {}", side(result.program_start));
    println!("  end:     {}", side(result.program_end));
    if let Some(length) = result.program_length() {
        println!("  length:  {}", format_seconds(length));
    }
    for note in &result.notes {
        println!("  note:    {note}");
    }
}

fn side(value: Option<f64>) -> String {
    match value {
        Some(secs) => format_seconds(secs),
        None => "unresolved".to_string(),
    }
}
