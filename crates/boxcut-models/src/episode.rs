//! Episode metadata types.
//!
//! Recordings are named `<Show Name>_<YYYY-MM-DD>_<HH-MM>.<ext>` by the
//! capture box. The show name and airdate parsed from the filename drive the
//! remote episode lookup; the resolved [`Episode`] only decorates reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One episode as returned by the episode database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub name: String,
    pub season: u32,
    pub number: u32,
    pub airdate: Option<NaiveDate>,
}

impl Episode {
    /// Canonical `S01E02` style code.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.number)
    }
}

/// A show with its episode list, as fetched once and cached on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    pub name: String,
    pub episodes: Vec<Episode>,
}

impl ShowRecord {
    /// Episode that aired on `date`, if any.
    pub fn episode_on(&self, date: NaiveDate) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.airdate == Some(date))
    }
}

/// Show name and airdate parsed out of a recording filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingName {
    pub show: String,
    pub airdate: NaiveDate,
}

impl RecordingName {
    /// Parse a recording file stem of the form `Show Name_YYYY-MM-DD_HH-MM`.
    ///
    /// Underscores inside the show name are folded back to spaces. Returns
    /// `None` when the stem does not match the capture-box naming scheme.
    pub fn parse(stem: &str) -> Option<Self> {
        let mut parts = stem.rsplitn(3, '_');
        let _time = parts.next()?;
        let date = parts.next()?;
        let show_raw = parts.next()?;

        if show_raw.is_empty() {
            return None;
        }

        let airdate = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let show = show_raw.replace('_', " ");

        Some(Self { show, airdate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording_name() {
        let parsed = RecordingName::parse("Panorama_2024-03-04_20-00").unwrap();
        assert_eq!(parsed.show, "Panorama");
        assert_eq!(
            parsed.airdate,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_parse_show_with_underscores() {
        let parsed = RecordingName::parse("Have_I_Got_News_For_You_2024-11-22_21-30").unwrap();
        assert_eq!(parsed.show, "Have I Got News For You");
    }

    #[test]
    fn test_parse_rejects_other_names() {
        assert!(RecordingName::parse("holiday-video").is_none());
        assert!(RecordingName::parse("Show_notadate_20-00").is_none());
        assert!(RecordingName::parse("_2024-03-04_20-00").is_none());
    }

    #[test]
    fn test_episode_on_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let show = ShowRecord {
            name: "Panorama".to_string(),
            episodes: vec![
                Episode {
                    name: "Other".to_string(),
                    season: 1,
                    number: 1,
                    airdate: NaiveDate::from_ymd_opt(2024, 2, 26),
                },
                Episode {
                    name: "The One We Want".to_string(),
                    season: 1,
                    number: 2,
                    airdate: Some(date),
                },
            ],
        };

        let hit = show.episode_on(date).unwrap();
        assert_eq!(hit.name, "The One We Want");
        assert_eq!(hit.code(), "S01E02");
    }
}
