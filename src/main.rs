//! # Naver News Collector
//!
//! Collects Naver News search results for a query, keeps the articles
//! published inside a date window, and exports them to a CSV file.
//!
//! ## Usage
//!
//! ```sh
//! NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... \
//!     naver_news_collector --query 야놀자리서치 --start-date 20250401
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: request one page of results at a time, newest first
//! 2. **Filtering**: keep items inside the window, stop at the first older one
//! 3. **Normalizing**: decode HTML, extract matched keywords, derive calendar keys
//! 4. **Output**: write every kept record to a BOM-prefixed CSV file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod error;
mod models;
mod normalize;
mod outputs;
mod utils;

use api::NaverClient;
use cli::Cli;
use collector::{Collector, ConsoleReporter, StopReason};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("naver_news_collector starting up");

    let args = Cli::parse();
    let config = args.into_run_config(Local::now().date_naive())?;
    debug!(?config, "Resolved run configuration");
    info!(
        query = %config.criteria.query(),
        start = %config.criteria.start(),
        end = %config.criteria.end(),
        sort = %config.criteria.sort(),
        "Search window"
    );

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = NaverClient::new(&config.api)?;
    let collector = Collector::new(client);
    let mut reporter = ConsoleReporter::new();

    let collection = match collector.collect(&config.criteria, &mut reporter).await {
        Ok(collection) => collection,
        Err(e) => {
            error!(error = %e, "First search request failed; nothing collected");
            return Err(e.into());
        }
    };
    reporter.finish();

    if let StopReason::FetchFailed(ref e) = collection.stop {
        warn!(
            error = %e,
            collected = collection.records.len(),
            "Search stopped early; exporting partial results"
        );
    }

    let path = outputs::csv::output_path(&config.output_dir, &config.criteria);
    if let Err(e) = outputs::csv::write_records(&collection.records, &path).await {
        error!(path = %path.display(), error = %e, "Failed to write CSV export");
        return Err(e.into());
    }
    println!("Saved to: {}", path.display());

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = collection.records.len(),
        reported = reporter.count(),
        pages = collection.pages_fetched,
        stop = ?collection.stop,
        partial = collection.is_partial(),
        "Execution complete"
    );

    Ok(())
}
