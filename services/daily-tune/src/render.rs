//!
//! src/render.rs
//!
//! Formats the day's pick, or a failure notice, into the markdown
//! status document
//!

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::TuneError;
use crate::sink;
use crate::types::{SearchQuery, TrackRecord};

pub const HEADING: &str = "# 🎵 Daily Music Recommendation";
pub const FAILURE_NOTICE: &str = "Sorry, today's recommendation could not be fetched.";
const FOOTER: &str = "---\nMaintained by an automated update bot.\n";

fn timestamp(now: DateTime<Utc>) -> String {
    format!("⏳ Updated: {} (UTC)", now.format("%Y-%m-%d %H:%M:%S"))
}

fn render_failure(query: Option<&SearchQuery>, now: DateTime<Utc>) -> String {
    let mut doc = format!("\n{HEADING}\n\n{FAILURE_NOTICE}  \n");
    if let Some(q) = query {
        doc.push_str(&format!("Combination: `{}` | Storefront: `{}`\n", q.keyword, q.country));
    }
    doc.push_str(&format!("\n{}\n\n{FOOTER}", timestamp(now)));
    doc
}

/// The link line is always written, the preview line only with a preview url
fn render_track(track: &TrackRecord, now: DateTime<Utc>) -> String {
    let mut doc = format!("\n{HEADING}\n\nToday's pick is...\n\n");
    doc.push_str(&format!("## 🎧 {}  \n", track.title));
    doc.push_str(&format!("> Artist: **{}**  \n", track.artist));
    doc.push_str(&format!("> Album: _{}_  \n\n", track.album));

    if let Some(keyword) = &track.keyword {
        doc.push_str(&format!("🔍 Search keyword: `{keyword}`  \n"));
    }
    if let Some(country) = &track.country {
        doc.push_str(&format!("🌎 Storefront: `{country}`\n\n"));
    }

    doc.push_str(&format!("[🔗 View on iTunes]({})  \n", track.link_url));
    if !track.preview_url.is_empty() {
        doc.push_str(&format!("[▶️ Preview]({})\n", track.preview_url));
    }

    doc.push_str(&format!("\n![Album artwork]({})\n\n", track.artwork_url));
    doc.push_str(&format!("{}\n\n{FOOTER}", timestamp(now)));
    doc
}

/// Full document text; `query` is only shown on the failure notice
pub fn render_document(
    track: Option<&TrackRecord>,
    query: Option<&SearchQuery>,
    now: DateTime<Utc>
) -> String {
    match track {
        Some(track) => render_track(track, now),
        None => render_failure(query, now),
    }
}

/// Renders and replaces the status document at `path`
pub fn write_document(
    path: &Path,
    track: Option<&TrackRecord>,
    query: Option<&SearchQuery>,
    now: DateTime<Utc>
) -> Result<(), TuneError> {
    let doc = render_document(track, query, now);
    sink::write_atomic(path, doc.as_bytes())?;
    info!(path = %path.display(), bytes = doc.len(), "render.write");
    Ok(())
}
