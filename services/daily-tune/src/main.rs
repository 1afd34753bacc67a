//!
//! src/main.rs
//!
//! Entry point of the daily recommendation job: loads config,
//! starts the logger, and runs a single pass of the recommender
//!

mod config;
mod errors;
mod logging;

mod cache;
mod fetch;
mod query;
mod recommender;
mod render;
mod sink;
mod types;

use chrono::Utc;
use rand::{rngs::SmallRng, SeedableRng};

use crate::errors::TuneError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TuneError> {
    let cfgs = config::load_config()?;
    let _logger = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service = "daily-tune",
        version = %env!("CARGO_PKG_VERSION"),
        cache = cfgs.output.cache_enabled,
        "starting"
    );

    let itunes = fetch::ITunesClient::new(&cfgs.http, &cfgs.itunes)?;
    let recommender = recommender::Recommender::from_config(itunes, &cfgs);

    let mut rng = SmallRng::from_entropy();
    let report = recommender.run(Utc::now(), &mut rng).await?;

    tracing::info!(
        origin = report.origin.as_str(),
        keyword = report.query.as_ref().map(|q| q.keyword.as_str()),
        title = report.track.as_ref().map(|t| t.title.as_str()),
        document = %report.document.display(),
        "finished"
    );

    Ok(())
}
