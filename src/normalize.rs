//! Turning raw search hits into export rows.
//!
//! The API returns `title` and `description` as HTML fragments: entities are
//! escaped and matched terms are wrapped in `<b>…</b>`. Parsing each fragment
//! once with `scraper` gives both the decoded plain text and the emphasized
//! terms.

use crate::error::ParseError;
use crate::models::{CalendarKeys, NormalizedRecord, RawItem};
use chrono::{DateTime, FixedOffset, NaiveDate};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Format of the API's `pubDate` field.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

static EMPHASIS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("b").expect("`b` is a valid selector"));

/// Parse a `pubDate` value such as `Wed, 02 Apr 2025 10:15:00 +0900`.
pub fn parse_pub_date(raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_str(raw.trim(), PUB_DATE_FORMAT).map_err(|source| ParseError {
        raw: raw.to_string(),
        source,
    })
}

/// A decoded text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText {
    /// Entity-decoded text without emphasis markers.
    pub plain: String,
    /// Contents of each emphasis pair, in document order.
    pub emphasized: Vec<String>,
}

/// Decode entities in `raw` and split it into plain text and emphasized terms.
pub fn decode_marked(raw: &str) -> MarkedText {
    let fragment = Html::parse_fragment(raw);
    let plain = fragment.root_element().text().collect::<String>();
    let emphasized = fragment
        .select(&EMPHASIS)
        .map(|el| el.text().collect::<String>())
        .collect();
    MarkedText { plain, emphasized }
}

/// Join the unique, non-empty emphasized terms of all fields.
///
/// Returns `None` when nothing was emphasized.
pub fn keyword_string<'a>(fields: impl IntoIterator<Item = &'a MarkedText>) -> Option<String> {
    let joined = fields
        .into_iter()
        .flat_map(|field| field.emphasized.iter())
        .filter(|term| !term.is_empty())
        .unique()
        .join(", ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Build the export row for an item already known to be inside the window.
///
/// `published` is the item's parsed timestamp; the record's date is the
/// calendar date in the timestamp's own offset.
pub fn normalize(item: RawItem, published: DateTime<FixedOffset>) -> NormalizedRecord {
    let title = decode_marked(&item.title);
    let desc = decode_marked(&item.description);
    let keyword = keyword_string([&title, &desc]);
    let date = published.date_naive();

    let CalendarKeys {
        year,
        month,
        ym,
        yq,
    } = CalendarKeys::from_date(date);

    NormalizedRecord {
        year,
        month,
        ym,
        yq,
        date,
        search_date: item.pub_date,
        keyword,
        title: title.plain,
        desc: desc.plain,
        link: item.link,
        original: item.original_link,
    }
}

/// Date used for window checks.
pub fn publication_date(published: &DateTime<FixedOffset>) -> NaiveDate {
    published.date_naive()
}
