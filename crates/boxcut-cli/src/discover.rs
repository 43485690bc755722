//! Recording discovery.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Container extensions the capture box produces.
pub const RECORDING_EXTENSIONS: &[&str] = &["ts", "m2ts", "mp4", "mkv"];

/// Find recordings directly inside `dir`, sorted by name for a stable batch
/// order. Subdirectories are not descended into.
pub async fn find_recordings(dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("cannot read recording directory {}", dir.display()))?;

    let mut recordings = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                RECORDING_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if matches {
            recordings.push(path);
        }
    }

    recordings.sort();
    Ok(recordings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_finds_recordings_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b_2024-01-02_20-00.ts", "a_2024-01-01_20-00.ts", "notes.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        tokio::fs::create_dir(dir.path().join("sub.ts")).await.unwrap();

        let found = find_recordings(dir.path()).await.unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a_2024-01-01_20-00.ts", "b_2024-01-02_20-00.ts"]);
    }

    #[tokio::test]
    async fn test_extension_case_insensitive() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("Show_2024-01-01_20-00.TS"), b"x")
            .await
            .unwrap();

        let found = find_recordings(dir.path()).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(find_recordings(&missing).await.is_err());
    }
}
