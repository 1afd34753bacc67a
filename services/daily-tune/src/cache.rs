//!
//! src/cache.rs
//!
//! Single-file memo of the last pick, valid for the calendar day
//! stamped on it
//!

use std::{fs, io::ErrorKind, path::{Path, PathBuf}};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::errors::TuneError;
use crate::sink;
use crate::types::TrackRecord;

#[derive(Debug, Clone)]
pub struct DailyCache {
    path: PathBuf
}

impl DailyCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored entry without checking its date
    fn read_entry(&self) -> Result<Option<TrackRecord>, TuneError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TuneError::Cache(
                format!("read {}: {e}", self.path.display())
            )),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| TuneError::Cache(format!("parse {}: {e}", self.path.display())))
    }

    /// Today's record, or None when the file is missing, stale, or corrupt
    pub fn load(&self, today: NaiveDate) -> Option<TrackRecord> {
        match self.read_entry() {
            Ok(Some(record)) if record.date == Some(today) => Some(record),
            Ok(Some(record)) => {
                debug!(stored = ?record.date, %today, "cache.stale");
                None
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "cache.unreadable");
                None
            }
        }
    }

    /// Overwrites the cache with `record` stamped as `today`
    pub fn save(&self, record: &TrackRecord, today: NaiveDate) -> Result<(), TuneError> {
        let mut entry = record.clone();
        entry.date = Some(today);

        let json = serde_json::to_vec_pretty(&entry)?;
        sink::write_atomic(&self.path, &json)
            .map_err(|e| TuneError::Cache(format!("write {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn record() -> TrackRecord {
        TrackRecord {
            title: "Butter".into(),
            artist: "BTS".into(),
            album: "Butter (Hotter, Sweeter, Cooler)".into(),
            artwork_url: "https://example.org/a.jpg".into(),
            preview_url: String::new(),
            link_url: "https://music.apple.com/kr/album/2".into(),
            country: Some("KR".into()),
            keyword: Some("kpop+summer".into()),
            date: Some(day(15)),
        }
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join("none.json"));
        assert!(cache.load(day(16)).is_none());
    }

    #[test]
    fn same_day_round_trip_hits() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join(".cache/tune.json"));

        cache.save(&record(), day(16)).unwrap();
        let loaded = cache.load(day(16)).unwrap();

        assert_eq!(loaded.date, Some(day(16)));
        assert_eq!(loaded.title, "Butter");
        assert_eq!(loaded.keyword.as_deref(), Some("kpop+summer"));
    }

    #[test]
    fn stale_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join("tune.json"));

        cache.save(&record(), day(15)).unwrap();
        assert!(cache.load(day(16)).is_none());
    }

    #[test]
    fn undated_or_corrupt_entries_are_misses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.json");
        let cache = DailyCache::new(&path);

        let mut undated = record();
        undated.date = None;
        fs::write(&path, serde_json::to_vec(&undated).unwrap()).unwrap();
        assert!(cache.load(day(15)).is_none());

        fs::write(&path, "{ not json").unwrap();
        assert!(cache.load(day(15)).is_none());
        assert!(matches!(cache.read_entry(), Err(TuneError::Cache(_))));
    }

    #[test]
    fn save_overwrites_previous_day() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join("tune.json"));

        cache.save(&record(), day(15)).unwrap();
        let mut next = record();
        next.title = "Dynamite".into();
        cache.save(&next, day(16)).unwrap();

        assert!(cache.load(day(15)).is_none());
        assert_eq!(cache.load(day(16)).unwrap().title, "Dynamite");
    }

    #[test]
    fn file_uses_iso_date_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DailyCache::new(dir.path().join("tune.json"));
        cache.save(&record(), day(16)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["date"], "2026-10-16");
        assert_eq!(raw["artist"], "BTS");
    }
}
