//!
//! src/query.rs
//!
//! Random keyword/storefront combinations used as search input
//!

use rand::{seq::SliceRandom, Rng};

use crate::config::QueryMode;
use crate::types::SearchQuery;

pub const GENRE_KEYWORDS: [&str; 10] = [
    "kpop", "pop", "hiphop", "ballad", "jazz",
    "acoustic", "rock", "lofi", "instrumental", "rnb"
];

pub const MOOD_KEYWORDS: [&str; 8] = [
    "love", "sad", "happy", "summer", "night", "rain", "dream", "hope"
];

// ISO 3166 alpha-2 storefronts
pub const COUNTRY_CODES: [&str; 6] = ["KR", "JP", "US", "GB", "FR", "DE"];

pub const SIMPLE_KEYWORDS: [&str; 10] = [
    "love", "dance", "jazz", "rock", "lofi", "pop", "kpop", "ballad", "piano", "rap"
];
pub const SIMPLE_COUNTRY: &str = "KR";

fn pick<'a, R: Rng + ?Sized>(list: &[&'a str], rng: &mut R) -> &'a str {
    // lists are non-empty constants
    list.choose(rng).copied().unwrap_or_default()
}

/// Uniformly picks a query from the lists belonging to `mode`
pub fn random_query<R: Rng + ?Sized>(mode: QueryMode, rng: &mut R) -> SearchQuery {
    match mode {
        QueryMode::Mixed => {
            let genre = pick(&GENRE_KEYWORDS, rng);
            let mood = pick(&MOOD_KEYWORDS, rng);
            let country = pick(&COUNTRY_CODES, rng);
            SearchQuery::new(format!("{genre}+{mood}"), country)
        },
        QueryMode::Simple => {
            SearchQuery::new(pick(&SIMPLE_KEYWORDS, rng), SIMPLE_COUNTRY)
        }
    }
}
