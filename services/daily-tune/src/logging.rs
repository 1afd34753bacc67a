//!
//! src/logging.rs
//!
//! Initializes logger so that each run leaves an informative trail
//! on the console, as pretty text or flattened json
//!

use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::TuneError;

pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

/// Filter from RUST_LOG when set, otherwise from the configured directives
fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()))
}

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, TuneError> {
    let (writer, guard) = non_blocking(std::io::stdout());
    let filter = build_filter(cfg);
    let time = fmt::time::UtcTime::rfc_3339();

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match cfg.format {
        LogFormat::Json => fmt::layer()
            .with_writer(writer)
            .with_timer(time)
            .with_ansi(false)
            .with_target(cfg.include_target)
            .with_file(cfg.include_file_line)
            .with_line_number(cfg.include_file_line)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_timer(time)
            .with_ansi(cfg.with_ansi)
            .with_target(cfg.include_target)
            .with_file(cfg.include_file_line)
            .with_line_number(cfg.include_file_line)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TuneError::Config(format!("logger already set: {e}")))?;

    Ok( LoggingGuard(guard) )
}
