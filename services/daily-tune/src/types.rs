use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

// keyword is kept in its display form, e.g. "kpop+love"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub country: String
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, country: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), country: country.into() }
    }

    /// Search term as sent to the api, "+" joins become spaces
    pub fn term(&self) -> String {
        self.keyword.replace('+', " ")
    }
}

/// Normalized song metadata used to render the status document.
/// `date` is set on fetch and doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork_url: String,
    pub preview_url: String,
    pub link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>
}
