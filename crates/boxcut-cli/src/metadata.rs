//! Episode metadata lookup with an on-disk cache.
//!
//! Recordings carry show name and airdate in their filenames; the remote
//! episode database maps those to a season/episode code for reporting. The
//! full episode list of a show is fetched once and cached as JSON, so a
//! season's worth of recordings costs one request.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use boxcut_models::{Episode, RecordingName, ShowRecord};

/// Default episode database endpoint (TVmaze-compatible API).
pub const DEFAULT_API_BASE: &str = "https://api.tvmaze.com";

/// Client for the episode database.
pub struct EpisodeClient {
    http: reqwest::Client,
    base_url: String,
    cache_dir: PathBuf,
}

impl EpisodeClient {
    pub fn new(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Client configured from `BOXCUT_EPISODE_API` and the user cache dir.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("BOXCUT_EPISODE_API").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base_url, default_cache_dir())
    }

    /// Resolve the episode a recording belongs to, if the database knows it.
    ///
    /// Network and cache failures surface as errors to the caller, which
    /// treats lookup as best-effort; an unknown show or airdate is `Ok(None)`.
    pub async fn lookup(&self, recording: &RecordingName) -> anyhow::Result<Option<Episode>> {
        let show = match self.cached_show(&recording.show).await {
            Some(show) => show,
            None => match self.fetch_show(&recording.show).await? {
                Some(show) => {
                    self.store_show(&show).await?;
                    show
                }
                None => return Ok(None),
            },
        };

        Ok(show.episode_on(recording.airdate).cloned())
    }

    async fn cached_show(&self, show: &str) -> Option<ShowRecord> {
        let path = self.cache_path(show);
        let bytes = tokio::fs::read(&path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(record) => {
                debug!(show, cache = %path.display(), "Episode cache hit");
                Some(record)
            }
            Err(e) => {
                warn!(show, error = %e, "Discarding unreadable episode cache entry");
                None
            }
        }
    }

    async fn store_show(&self, show: &ShowRecord) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .with_context(|| format!("cannot create cache dir {}", self.cache_dir.display()))?;
        let path = self.cache_path(&show.name);
        let json = serde_json::to_vec_pretty(show)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("cannot write episode cache {}", path.display()))?;
        Ok(())
    }

    async fn fetch_show(&self, show: &str) -> anyhow::Result<Option<ShowRecord>> {
        let url = format!("{}/singlesearch/shows", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", show), ("embed", "episodes")])
            .send()
            .await
            .with_context(|| format!("episode lookup request failed for '{show}'"))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(show, "Episode database does not know this show");
            return Ok(None);
        }

        let api_show: ApiShow = response
            .error_for_status()
            .with_context(|| format!("episode lookup failed for '{show}'"))?
            .json()
            .await
            .context("episode lookup returned malformed JSON")?;

        Ok(Some(api_show.into_record()))
    }

    fn cache_path(&self, show: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", slug(show)))
    }
}

/// User cache directory per XDG, with a temp-dir fallback.
fn default_cache_dir() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".cache")))
        .unwrap_or_else(std::env::temp_dir)
        .join("boxcut")
}

/// Filesystem-safe cache key for a show name.
fn slug(show: &str) -> String {
    let mut out = String::with_capacity(show.len());
    for c in show.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[derive(Debug, Deserialize)]
struct ApiShow {
    name: String,
    #[serde(rename = "_embedded")]
    embedded: Option<ApiEmbedded>,
}

#[derive(Debug, Deserialize)]
struct ApiEmbedded {
    episodes: Vec<ApiEpisode>,
}

#[derive(Debug, Deserialize)]
struct ApiEpisode {
    name: String,
    season: u32,
    number: Option<u32>,
    airdate: Option<String>,
}

impl ApiShow {
    fn into_record(self) -> ShowRecord {
        let episodes = self
            .embedded
            .map(|e| e.episodes)
            .unwrap_or_default()
            .into_iter()
            .map(|e| Episode {
                name: e.name,
                season: e.season,
                number: e.number.unwrap_or(0),
                airdate: e
                    .airdate
                    .as_deref()
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            })
            .collect();

        ShowRecord {
            name: self.name,
            episodes,
        }
    }
}
