//!
//! src/errors.rs
//!
//! Defines enums and methods of error conversion
//! for errors the recommender uses
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuneError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<reqwest::Error> for TuneError {
    fn from(e: reqwest::Error) -> Self { TuneError::Http(e.to_string()) }
}

impl From<serde_json::Error> for TuneError {
    fn from(e: serde_json::Error) -> Self { TuneError::Parse(e.to_string()) }
}
