//! Subcommand execution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, warn};

use boxcut_media::detect::DetectOptions;
use boxcut_media::{detect_boundaries, trim_recording};
use boxcut_models::timestamp::validate_range;
use boxcut_models::{EncodingConfig, Episode, RecordingName};

use crate::cli::{Cli, Command, DetectArgs};
use crate::discover::find_recordings;
use crate::metadata::EpisodeClient;
use crate::report;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Detect { file, detect, json } => run_detect(&file, &detect, json).await,
        Command::Scan {
            dir,
            detect,
            apply,
            delete_original,
            lookup,
            json,
        } => run_scan(&dir, &detect, apply, delete_original, lookup, json).await,
        Command::Trim {
            file,
            start,
            end,
            output,
        } => run_trim(&file, &start, &end, output).await,
    }
}

async fn run_detect(file: &Path, args: &DetectArgs, json: bool) -> anyhow::Result<()> {
    let result = detect_boundaries(file, &args.to_options()).await?;
    report::print_result(file, &result, None, json);
    Ok(())
}

async fn run_scan(
    dir: &Path,
    args: &DetectArgs,
    apply: bool,
    delete_original: bool,
    lookup: bool,
    json: bool,
) -> anyhow::Result<()> {
    let recordings = find_recordings(dir).await?;
    if recordings.is_empty() {
        warn!(dir = %dir.display(), "No recordings found");
        return Ok(());
    }

    info!(count = recordings.len(), "Scanning recordings");
    let client = lookup.then(EpisodeClient::from_env);
    let opts = args.to_options();

    let mut failed = 0usize;
    for file in &recordings {
        // One file's fatal failure never stops the batch
        if let Err(e) =
            process_recording(file, &opts, apply, delete_original, client.as_ref(), json).await
        {
            error!(file = %file.display(), "Skipping recording: {e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} recordings failed", recordings.len());
    }
    Ok(())
}

async fn process_recording(
    file: &Path,
    opts: &DetectOptions,
    apply: bool,
    delete_original: bool,
    client: Option<&EpisodeClient>,
    json: bool,
) -> anyhow::Result<()> {
    let result = detect_boundaries(file, opts).await?;

    let episode = match client {
        Some(client) => lookup_episode(client, file).await,
        None => None,
    };

    report::print_result(file, &result, episode.as_ref(), json);

    if !apply {
        return Ok(());
    }

    let (Some(start), Some(end)) = (result.program_start, result.program_end) else {
        warn!(file = %file.display(), "Boundaries unresolved, leaving recording untrimmed");
        return Ok(());
    };

    let output = trimmed_path(file);
    trim_recording(file, &output, start, end, &EncodingConfig::default()).await?;

    if delete_original {
        delete_after_trim(file, &output).await?;
    }

    Ok(())
}

/// Best-effort episode lookup; any failure degrades to a warning.
async fn lookup_episode(client: &EpisodeClient, file: &Path) -> Option<Episode> {
    let stem = file.file_stem()?.to_str()?;
    let name = RecordingName::parse(stem)?;

    match client.lookup(&name).await {
        Ok(episode) => episode,
        Err(e) => {
            warn!(show = %name.show, "Episode lookup failed: {e:#}");
            None
        }
    }
}

async fn run_trim(
    file: &Path,
    start: &str,
    end: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (start_secs, end_secs) = validate_range(start, end)?;
    let output = output.unwrap_or_else(|| trimmed_path(file));

    trim_recording(file, &output, start_secs, end_secs, &EncodingConfig::default()).await?;
    println!("{}", output.display());
    Ok(())
}

fn trimmed_path(file: &Path) -> PathBuf {
    file.with_extension("cut.mp4")
}

/// Remove the original only when the trimmed output verifiably exists and has
/// content.
async fn delete_after_trim(original: &Path, trimmed: &Path) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(trimmed)
        .await
        .with_context(|| format!("trimmed output {} is missing", trimmed.display()))?;

    if metadata.len() == 0 {
        anyhow::bail!(
            "trimmed output {} is empty, keeping original",
            trimmed.display()
        );
    }

    tokio::fs::remove_file(original)
        .await
        .with_context(|| format!("cannot delete original {}", original.display()))?;
    info!(original = %original.display(), "Deleted original recording");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_trimmed_path() {
        assert_eq!(
            trimmed_path(Path::new("/rec/Show_2024-03-04_20-00.ts")),
            Path::new("/rec/Show_2024-03-04_20-00.cut.mp4")
        );
    }

    #[tokio::test]
    async fn test_delete_after_trim_requires_output() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("a.ts");
        tokio::fs::write(&original, b"original").await.unwrap();

        let missing = dir.path().join("a.cut.mp4");
        assert!(delete_after_trim(&original, &missing).await.is_err());
        assert!(original.exists(), "original must survive a missing output");
    }

    #[tokio::test]
    async fn test_delete_after_trim_rejects_empty_output() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("a.ts");
        let trimmed = dir.path().join("a.cut.mp4");
        tokio::fs::write(&original, b"original").await.unwrap();
        tokio::fs::write(&trimmed, b"").await.unwrap();

        assert!(delete_after_trim(&original, &trimmed).await.is_err());
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_delete_after_trim_removes_original() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("a.ts");
        let trimmed = dir.path().join("a.cut.mp4");
        tokio::fs::write(&original, b"original").await.unwrap();
        tokio::fs::write(&trimmed, b"trimmed content").await.unwrap();

        delete_after_trim(&original, &trimmed).await.unwrap();
        assert!(!original.exists());
        assert!(trimmed.exists());
    }
}
