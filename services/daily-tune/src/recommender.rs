//!
//! src/recommender.rs
//!
//! One pass of the job: cache lookup, search, pick, render
//!

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::DailyCache;
use crate::config::{AppConfig, QueryMode};
use crate::errors::TuneError;
use crate::fetch::{self, TrackSource};
use crate::query;
use crate::render;
use crate::types::{SearchQuery, TrackRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOrigin {
    Cache,
    Fetched,
    Failed
}

impl PickOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            PickOrigin::Cache   => "cache",
            PickOrigin::Fetched => "fetched",
            PickOrigin::Failed  => "failed"
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub origin: PickOrigin,
    pub query: Option<SearchQuery>,
    pub track: Option<TrackRecord>,
    pub document: PathBuf
}

pub struct Recommender<S> {
    source: S,
    cache: Option<DailyCache>,
    mode: QueryMode,
    readme_path: PathBuf
}

impl<S: TrackSource> Recommender<S> {
    pub fn new(
        source: S,
        cache: Option<DailyCache>,
        mode: QueryMode,
        readme_path: impl Into<PathBuf>
    ) -> Self {
        Self { source, cache, mode, readme_path: readme_path.into() }
    }

    pub fn from_config(source: S, cfg: &AppConfig) -> Self {
        let cache = cfg.output.cache_enabled
            .then(|| DailyCache::new(&cfg.output.cache_path));
        Self::new(source, cache, cfg.query, cfg.output.readme_path.clone())
    }

    /// Searches and picks; failures are logged and come back as None
    async fn fetch_fresh<R: Rng + ?Sized>(
        &self,
        query: &SearchQuery,
        now: DateTime<Utc>,
        rng: &mut R
    ) -> Option<TrackRecord> {
        match fetch::fetch_track(&self.source, query, now.date_naive(), rng).await {
            Ok(track) => Some(track),
            Err(e) => {
                error!(
                    error = %e,
                    keyword = %query.keyword,
                    country = %query.country,
                    "recommend.fetch.failed"
                );
                None
            }
        }
    }

    pub async fn run<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R
    ) -> Result<RunReport, TuneError> {
        let span = info_span!("recommend", run_id = %Uuid::new_v4());
        async move {
            let today = now.date_naive();

            let hit = self.cache.as_ref()
                .and_then(|c| c.load(today).map(|record| (c.path(), record)));
            if let Some((path, cached)) = hit {
                info!(
                    title = %cached.title,
                    artist = %cached.artist,
                    cache = %path.display(),
                    "recommend.cache.hit"
                );
                render::write_document(&self.readme_path, Some(&cached), None, now)?;
                return Ok(RunReport {
                    origin: PickOrigin::Cache,
                    query: None,
                    track: Some(cached),
                    document: self.readme_path.clone()
                });
            }

            let query = query::random_query(self.mode, rng);
            info!(keyword = %query.keyword, country = %query.country, "recommend.search");

            let track = self.fetch_fresh(&query, now, rng).await;
            if let (Some(track), Some(cache)) = (&track, &self.cache) {
                if let Err(e) = cache.save(track, today) {
                    warn!(error = %e, "recommend.cache.save_failed");
                }
            }

            render::write_document(&self.readme_path, track.as_ref(), Some(&query), now)?;

            let origin = if track.is_some() { PickOrigin::Fetched } else { PickOrigin::Failed };
            info!(origin = origin.as_str(), "recommend.done");

            Ok(RunReport {
                origin,
                query: Some(query),
                track,
                document: self.readme_path.clone()
            })
        }
        .instrument(span)
        .await
    }
}
