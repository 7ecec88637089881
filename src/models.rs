//! Data models for search requests, raw API items, and normalized records.
//!
//! - [`SearchCriteria`]: the validated, immutable description of one run
//! - [`RawItem`]: a single entry of the search API's `items` array
//! - [`NormalizedRecord`]: an in-window item ready for export
//!
//! `NormalizedRecord` field names are renamed to the CSV column names so the
//! same serde derive drives both export and re-import.

use crate::error::CriteriaError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest `display` value the search API accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Result ordering requested from the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Newest first. Required for the date cutoff to be sound.
    #[default]
    #[value(name = "date")]
    Date,
    /// Relevance ordering.
    #[value(name = "sim")]
    Similarity,
}

impl SortOrder {
    /// Value of the `sort` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Similarity => "sim",
        }
    }

    pub fn is_date_descending(&self) -> bool {
        matches!(self, SortOrder::Date)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Where a publication date falls relative to the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Before,
    Within,
    After,
}

/// Immutable description of a single collection run.
///
/// Both dates are inclusive. Construction enforces `start <= end` and a page
/// size within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    query: String,
    start: NaiveDate,
    end: NaiveDate,
    page_size: usize,
    sort: SortOrder,
}

impl SearchCriteria {
    pub fn new(
        query: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        page_size: usize,
        sort: SortOrder,
    ) -> Result<Self, CriteriaError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(CriteriaError::EmptyQuery);
        }
        if start > end {
            return Err(CriteriaError::InvertedWindow { start, end });
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(CriteriaError::PageSize(page_size));
        }
        Ok(Self {
            query,
            start,
            end,
            page_size,
            sort,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn position_of(&self, date: NaiveDate) -> WindowPosition {
        if date < self.start {
            WindowPosition::Before
        } else if date > self.end {
            WindowPosition::After
        } else {
            WindowPosition::Within
        }
    }
}

/// Body of a search API response. Only `items` is used.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// One search hit exactly as the API returns it.
///
/// `title` and `description` are HTML-escaped and wrap matched query terms in
/// `<b>…</b>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "originallink")]
    pub original_link: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    /// e.g. `Wed, 02 Apr 2025 10:15:00 +0900`
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// A cleaned, in-window article, one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub year: i32,
    pub month: u32,
    /// `YYYYMM`
    pub ym: String,
    /// `YYYY-Qn`
    pub yq: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Publication timestamp as received.
    #[serde(rename = "SearchDate")]
    pub search_date: String,
    /// Matched terms joined by `", "`.
    #[serde(rename = "Keyword")]
    pub keyword: Option<String>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Desc")]
    pub desc: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Original")]
    pub original: String,
}

/// Column order of the export.
pub const COLUMNS: [&str; 11] = [
    "year",
    "month",
    "ym",
    "yq",
    "Date",
    "SearchDate",
    "Keyword",
    "Title",
    "Desc",
    "Link",
    "Original",
];

/// Calendar grouping keys derived from a publication date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarKeys {
    pub year: i32,
    pub month: u32,
    pub ym: String,
    pub yq: String,
}

impl CalendarKeys {
    pub fn from_date(date: NaiveDate) -> Self {
        let quarter = (date.month() - 1) / 3 + 1;
        Self {
            year: date.year(),
            month: date.month(),
            ym: date.format("%Y%m").to_string(),
            yq: format!("{}-Q{}", date.year(), quarter),
        }
    }
}
