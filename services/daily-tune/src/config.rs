use std::{path::PathBuf, time};
use url::Url;
use crate::TuneError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 15000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 5000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const ITUNES_HOST: &str = "itunes.apple.com";
pub const ITUNES_SEARCH_LIMIT: u32 = 10;
pub const ITUNES_MAX_LIMIT: u32 = 200;

pub const README_PATH: &str = "README.md";
pub const CACHE_PATH: &str = ".cache/daily_tune.json";

/// Source of configuration values, the process environment in production
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Wrapper over lookup that treats blank values as unset
fn env_opt(env: Lookup, s: &str) -> Option<String> {
    match env(s) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

/// Parses an on/off style switch
fn parse_switch(name: &str, value: &str) -> Result<bool, TuneError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(TuneError::Config(format!("{name} must be on/off, got {other}")))
    }
}

///
/// Configuration for the iTunes search endpoint
///
#[derive(Debug, Clone)]
pub struct ITunesConfig {
    pub search_url: Url,    // https://itunes.apple.com/search
    pub media: String,      // always "music"
    pub limit: u32,         // default 10
}

fn build_itunes(env: Lookup) -> Result<ITunesConfig, TuneError> {
    let search_url = env_opt(env, "ITUNES_BASE_URL")
        .unwrap_or_else(|| ITUNES_SEARCH_URL.to_string());

    let search_url = Url::parse(&search_url)
        .map_err(|e| TuneError::Config(
            format!("ITUNES_BASE_URL invalid {e}")
        ))?;

    // https and hostname check
    ensure_https(&search_url).map_err(TuneError::Config)?;
    ensure_host(&search_url, ITUNES_HOST).map_err(TuneError::Config)?;

    let limit = match env_opt(env, "ITUNES_SEARCH_LIMIT") {
        Some(s) => s.parse::<u32>()
            .ok()
            .filter(|n| (1..=ITUNES_MAX_LIMIT).contains(n))
            .ok_or_else(|| TuneError::Config(
                format!("ITUNES_SEARCH_LIMIT must be 1..={ITUNES_MAX_LIMIT}, got {s}")
            ))?,
        None => ITUNES_SEARCH_LIMIT,
    };

    Ok( ITunesConfig { search_url, media: "music".to_string(), limit } )
}

///
/// Configuration for Http timeouts, redirects, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub max_redirects: u8,
    pub user_agent: String
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
            user_agent: format!("daily-tune/{}", env!("CARGO_PKG_VERSION"))
        }
    }
}

///
/// Which keyword lists feed the query builder
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Mixed,      // genre+mood across several storefronts
    Simple      // single keyword, KR storefront
}

fn build_query_mode(env: Lookup) -> Result<QueryMode, TuneError> {
    match env_opt(env, "DAILY_TUNE_QUERY_MODE").as_deref() {
        None => Ok(QueryMode::Mixed),
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "mixed" => Ok(QueryMode::Mixed),
            "simple" => Ok(QueryMode::Simple),
            other => Err(TuneError::Config(
                format!("DAILY_TUNE_QUERY_MODE must be mixed or simple, got {other}")
            ))
        }
    }
}

///
/// Configuration for the files written each run
///
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub readme_path: PathBuf,
    pub cache_enabled: bool,
    pub cache_path: PathBuf
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme_path: PathBuf::from(README_PATH),
            cache_enabled: true,
            cache_path: PathBuf::from(CACHE_PATH)
        }
    }
}

fn build_output(env: Lookup) -> Result<OutputConfig, TuneError> {
    let mut output = OutputConfig::default();

    if let Some(path) = env_opt(env, "DAILY_TUNE_README_PATH") {
        output.readme_path = PathBuf::from(path);
    }
    if let Some(flag) = env_opt(env, "DAILY_TUNE_CACHE") {
        output.cache_enabled = parse_switch("DAILY_TUNE_CACHE", &flag)?;
    }
    if let Some(path) = env_opt(env, "DAILY_TUNE_CACHE_PATH") {
        output.cache_path = PathBuf::from(path);
    }

    Ok(output)
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,daily_tune=debug,reqwest=warn".to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: false,
            include_target: true
        }
    }
}

fn build_logging(env: Lookup) -> Result<LoggingConfig, TuneError> {
    let mut logging = LoggingConfig::default();

    match env_opt(env, "DAILY_TUNE_LOG_FORMAT").as_deref() {
        None => {},
        Some(s) => match s.to_ascii_lowercase().as_str() {
            "pretty" => logging.format = LogFormat::Pretty,
            "json" => {
                logging.format = LogFormat::Json;
                logging.with_ansi = false;
                logging.include_file_line = true;
            },
            other => return Err(TuneError::Config(
                format!("DAILY_TUNE_LOG_FORMAT must be pretty or json, got {other}")
            ))
        }
    }

    Ok(logging)
}

///
/// AppConfig which holds everything a single run needs
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub itunes: ITunesConfig,
    pub http: HttpConfig,
    pub query: QueryMode,
    pub output: OutputConfig,
    pub logging: LoggingConfig
}

impl AppConfig {
    /// Builds the config from an arbitrary variable source
    pub fn from_lookup(env: Lookup) -> Result<Self, TuneError> {
        let itunes  = build_itunes(env)?;
        let http    = HttpConfig::default();
        let query   = build_query_mode(env)?;
        let output  = build_output(env)?;
        let logging = build_logging(env)?;

        Ok( AppConfig { itunes, http, query, output, logging } )
    }
}

///
/// Return configuration from .env and the process environment.
///
pub fn load_config() -> Result<AppConfig, TuneError> {
    dotenvy::dotenv().ok();
    AppConfig::from_lookup(&|key| std::env::var(key).ok())
}
