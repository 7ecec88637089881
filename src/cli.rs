//! Command-line interface definitions.
//!
//! Credentials can come from flags or from the `NAVER_CLIENT_ID` /
//! `NAVER_CLIENT_SECRET` environment variables. [`Cli::into_run_config`]
//! validates everything and produces the [`RunConfig`] the rest of the
//! program works from.

use crate::api::{ApiConfig, Credentials};
use crate::error::CriteriaError;
use crate::models::{MAX_PAGE_SIZE, SearchCriteria, SortOrder};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Date format accepted on the command line.
pub const CLI_DATE_FORMAT: &str = "%Y%m%d";

/// Command-line arguments for the collector.
///
/// # Examples
///
/// ```sh
/// # April 2025 to today
/// naver_news_collector --query 야놀자리서치 --start-date 20250401
///
/// # Explicit window and output directory
/// naver_news_collector -q "travel tech" -s 20250101 -e 20250331 -o ./exports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search keyword
    #[arg(short, long, default_value = "야놀자리서치")]
    pub query: String,

    /// First publication date to keep, YYYYMMDD (inclusive)
    #[arg(short, long, default_value = "20250401", value_parser = parse_cli_date)]
    pub start_date: NaiveDate,

    /// Last publication date to keep, YYYYMMDD (inclusive, default: today)
    #[arg(short, long, value_parser = parse_cli_date)]
    pub end_date: Option<NaiveDate>,

    /// Directory the CSV file is written to
    #[arg(short, long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Results requested per page (1-100)
    #[arg(long, default_value_t = MAX_PAGE_SIZE)]
    pub page_size: usize,

    /// Result ordering; the date cutoff only applies to `date`
    #[arg(long, value_enum, default_value_t = SortOrder::Date)]
    pub sort: SortOrder,

    /// Naver Open API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Naver Open API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Base URL of the search API
    #[arg(long, env = "NAVER_API_BASE_URL", default_value = "https://openapi.naver.com")]
    pub api_base_url: String,

    /// HTTP timeout per request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Everything a run needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub criteria: SearchCriteria,
    pub api: ApiConfig,
    pub output_dir: PathBuf,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected YYYYMMDD, got '{s}'"));
    }
    NaiveDate::parse_from_str(s, CLI_DATE_FORMAT).map_err(|e| format!("invalid date '{s}': {e}"))
}

impl Cli {
    /// Resolve defaults against `today` and validate the search window.
    pub fn into_run_config(self, today: NaiveDate) -> Result<RunConfig, CriteriaError> {
        let end = self.end_date.unwrap_or(today);
        let criteria = SearchCriteria::new(self.query, self.start_date, end, self.page_size, self.sort)?;
        Ok(RunConfig {
            criteria,
            api: ApiConfig {
                base_url: self.api_base_url,
                timeout: Duration::from_secs(self.timeout_secs),
                credentials: Credentials {
                    client_id: self.client_id,
                    client_secret: self.client_secret,
                },
            },
            output_dir: self.output_dir,
        })
    }
}
