//!
//! src/fetch.rs
//!
//! Defines the iTunes search client and the mapping from raw
//! search results into a normalized track record
//!

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::{seq::SliceRandom, Rng};
use reqwest::{Client, header, redirect, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::{HttpConfig, ITunesConfig};
use crate::types::{SearchQuery, TrackRecord, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use crate::TuneError;

/// Anything that can answer a track search with raw result objects
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, TuneError>;
}

#[async_trait]
impl<'a, T: TrackSource + ?Sized> TrackSource for &'a T {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, TuneError> {
        (**self).search(query).await
    }
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
        .user_agent(http.user_agent.clone())
}

pub fn base_client(http: &HttpConfig) -> Result<Client, TuneError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .build()
        .map_err(|e| TuneError::Http(format!("build client: {e}")))
}

#[derive(Clone, Debug)]
pub struct ITunesClient {
    pub http: Client,
    pub cfg: ITunesConfig
}

impl ITunesClient {
    pub fn new(http_config: &HttpConfig, cfg: &ITunesConfig) -> Result<Self, TuneError> {
        let http = base_client(http_config)?;
        Ok( Self { http, cfg: cfg.clone() } )
    }

    /// GET /search?term=...&media=music&country=..&limit=..
    pub fn search_request(&self, query: &SearchQuery) -> RequestBuilder {
        self.http.get(self.cfg.search_url.clone()).query(&[
            ("term", query.term().as_str()),
            ("media", self.cfg.media.as_str()),
            ("country", query.country.as_str()),
            ("limit", &self.cfg.limit.to_string())
        ])
    }
}

#[async_trait]
impl TrackSource for ITunesClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, TuneError> {
        let response = self.search_request(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TuneError::Http(format!("itunes search returned {status}")));
        }

        let body = response.json::<Value>().await?;
        let results = results_of(body);
        debug!(count = results.len(), keyword = %query.keyword, "itunes.search");
        Ok(results)
    }
}

/// Pulls the `results` array out of a search response; anything else is empty
pub fn results_of(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(results)) => results,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn text_or(v: &Value, key: &str, fallback: &str) -> String {
    v[key].as_str().unwrap_or(fallback).to_string()
}

/// Maps one raw result into a record, substituting placeholders for
/// missing or non-string fields
pub fn track_from_result(v: &Value, query: &SearchQuery, today: NaiveDate) -> TrackRecord {
    TrackRecord {
        title: text_or(v, "trackName", UNKNOWN_TRACK),
        artist: text_or(v, "artistName", UNKNOWN_ARTIST),
        album: text_or(v, "collectionName", UNKNOWN_ALBUM),
        artwork_url: text_or(v, "artworkUrl100", ""),
        preview_url: text_or(v, "previewUrl", ""),
        link_url: text_or(v, "trackViewUrl", ""),
        country: Some(query.country.clone()),
        keyword: Some(query.keyword.clone()),
        date: Some(today)
    }
}

/// Uniformly picks one result, None when there is nothing to pick
pub fn pick_track<R: Rng + ?Sized>(
    results: &[Value],
    query: &SearchQuery,
    today: NaiveDate,
    rng: &mut R
) -> Option<TrackRecord> {
    results.choose(rng).map(|v| track_from_result(v, query, today))
}

/// Runs one search and picks a track, empty results are `NotFound`
pub async fn fetch_track<S, R>(
    source: &S,
    query: &SearchQuery,
    today: NaiveDate,
    rng: &mut R
) -> Result<TrackRecord, TuneError>
where
    S: TrackSource + ?Sized,
    R: Rng + ?Sized
{
    let results = source.search(query).await?;
    pick_track(&results, query, today, rng).ok_or_else(|| TuneError::NotFound(
        format!("no results for {} in {}", query.keyword, query.country)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn live() -> bool {
        std::env::var("LIVE_HTTP").ok().as_deref() == Some("1")
    }

    struct FixedSource(Result<Vec<Value>, ()>);

    #[async_trait]
    impl TrackSource for FixedSource {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Value>, TuneError> {
            self.0.clone().map_err(|_| TuneError::Http("connection refused".into()))
        }
    }

    fn sample() -> Value {
        json!({
            "trackName": "Hype Boy",
            "artistName": "NewJeans",
            "collectionName": "New Jeans",
            "artworkUrl100": "https://is1-ssl.mzstatic.com/art/100x100bb.jpg",
            "previewUrl": "https://audio-ssl.itunes.apple.com/preview.m4a",
            "trackViewUrl": "https://music.apple.com/kr/album/1"
        })
    }

    #[test]
    fn request_carries_all_query_parameters() {
        let cfg = crate::config::AppConfig::from_lookup(&|_| None).unwrap();
        let client = ITunesClient::new(&cfg.http, &cfg.itunes).unwrap();

        let request = client.search_request(&SearchQuery::new("kpop+love", "KR"))
            .build()
            .unwrap();
        let url = request.url();
        assert_eq!(url.host_str(), Some("itunes.apple.com"));
        assert_eq!(url.path(), "/search");

        let pairs: Vec<(String, String)> = url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![
            ("term".to_string(), "kpop love".to_string()),
            ("media".to_string(), "music".to_string()),
            ("country".to_string(), "KR".to_string()),
            ("limit".to_string(), "10".to_string()),
        ]);
    }

    #[test]
    fn results_array_is_extracted() {
        let body = json!({ "resultCount": 2, "results": [sample(), sample()] });
        assert_eq!(results_of(body).len(), 2);
        assert!(results_of(json!({ "resultCount": 0 })).is_empty());
        assert!(results_of(json!({ "results": "nope" })).is_empty());
        assert!(results_of(json!([1, 2])).is_empty());
    }

    #[test]
    fn full_result_maps_verbatim() {
        let q = SearchQuery::new("kpop+love", "KR");
        let record = track_from_result(&sample(), &q, today());
        assert_eq!(record.title, "Hype Boy");
        assert_eq!(record.artist, "NewJeans");
        assert_eq!(record.album, "New Jeans");
        assert!(record.preview_url.ends_with("preview.m4a"));
        assert_eq!(record.keyword.as_deref(), Some("kpop+love"));
        assert_eq!(record.country.as_deref(), Some("KR"));
        assert_eq!(record.date, Some(today()));
    }

    #[test]
    fn missing_and_null_fields_get_placeholders() {
        let q = SearchQuery::new("jazz", "KR");
        let record = track_from_result(
            &json!({ "trackName": null, "collectionName": 42 }),
            &q,
            today()
        );
        assert_eq!(record.title, UNKNOWN_TRACK);
        assert_eq!(record.artist, UNKNOWN_ARTIST);
        assert_eq!(record.album, UNKNOWN_ALBUM);
        assert_eq!(record.artwork_url, "");
        assert_eq!(record.preview_url, "");
        assert_eq!(record.link_url, "");
    }

    #[test]
    fn pick_is_one_of_the_results() {
        let q = SearchQuery::new("rock", "KR");
        let results: Vec<Value> = (0..5)
            .map(|i| json!({ "trackName": format!("song {i}"), "artistName": "x" }))
            .collect();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let record = pick_track(&results, &q, today(), &mut rng).unwrap();
            assert!(record.title.starts_with("song "));
        }
        assert!(pick_track(&[], &q, today(), &mut rng).is_none());
    }

    #[tokio::test]
    async fn empty_results_are_not_found() {
        let q = SearchQuery::new("rap", "KR");
        let mut rng = SmallRng::seed_from_u64(1);
        let err = fetch_track(&FixedSource(Ok(vec![])), &q, today(), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TuneError::NotFound(_)));
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let q = SearchQuery::new("rap", "KR");
        let mut rng = SmallRng::seed_from_u64(1);
        let err = fetch_track(&FixedSource(Err(())), &q, today(), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TuneError::Http(_)));
    }

    #[tokio::test]
    async fn itunes_search_testbench() -> Result<(), TuneError> {
        if !live() {
            eprintln!("Set LIVE_HTTP=1 to run");
            return Ok(())
        }

        let cfg = crate::config::load_config()?;
        let client = ITunesClient::new(&cfg.http, &cfg.itunes)?;
        let q = SearchQuery::new("kpop+love", "KR");

        let results = client.search(&q).await?;
        println!("results: {}", results.len());

        let mut rng = SmallRng::from_entropy();
        let record = fetch_track(&client, &q, today(), &mut rng).await?;
        println!("record: {}", serde_json::to_string_pretty(&record)?);

        Ok(())
    }
}
