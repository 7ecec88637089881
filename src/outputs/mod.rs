//! Export of collected records.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── naver_news_RESULTS_{query}_{start}_{end}.csv
//! ```
//!
//! Dates in the file name use `YYYYMMDD`.

pub mod csv;
