//! Pagination and date-window cutoff.
//!
//! [`Collector`] walks the search results page by page, newest first, and
//! keeps every item whose publication date falls inside the criteria window.
//! Because results arrive date-descending, the first item older than the
//! window ends the run: nothing after it in the batch is looked at and no
//! further page is requested.
//!
//! # Stop reasons
//!
//! | Reason | Trigger |
//! |--------|---------|
//! | [`StopReason::Exhausted`] | a page came back empty |
//! | [`StopReason::CutoffReached`] | an item predates the window |
//! | [`StopReason::ShortPage`] | a page held fewer items than requested |
//! | [`StopReason::FetchFailed`] | a page after the first failed |
//!
//! A failure on the very first page is returned as an error instead.

use crate::api::SearchApi;
use crate::error::FetchError;
use crate::models::{NormalizedRecord, SearchCriteria, WindowPosition};
use crate::normalize::{normalize, parse_pub_date, publication_date};
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument, warn};

/// Why a collection run ended. Exactly one applies per run.
#[derive(Debug)]
pub enum StopReason {
    Exhausted,
    CutoffReached,
    ShortPage,
    /// Pagination aborted; records gathered so far are kept.
    FetchFailed(FetchError),
}

/// Outcome of a run: the accepted records in fetch order.
#[derive(Debug)]
pub struct Collection {
    pub records: Vec<NormalizedRecord>,
    pub stop: StopReason,
    pub pages_fetched: usize,
}

impl Collection {
    pub fn is_partial(&self) -> bool {
        matches!(self.stop, StopReason::FetchFailed(_))
    }
}

/// Receives each record as soon as the collector accepts it.
pub trait RecordObserver {
    fn on_record(&mut self, record: &NormalizedRecord);
}

impl<F> RecordObserver for F
where
    F: FnMut(&NormalizedRecord),
{
    fn on_record(&mut self, record: &NormalizedRecord) {
        self(record)
    }
}

/// Prints a short block per accepted record, then a total.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    count: usize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(&self) {
        println!("\nTotal articles collected: {}", self.count);
    }
}

impl RecordObserver for ConsoleReporter {
    fn on_record(&mut self, record: &NormalizedRecord) {
        self.count += 1;
        println!("[{}] {}", self.count, record.title);
        println!("  Link: {}", record.link);
        println!("  Original: {}", record.original);
        println!("  Desc: {}", record.desc);
        println!("  Date: {}", record.date);
        println!(
            "  Keyword(s): {}\n",
            record.keyword.as_deref().unwrap_or("-")
        );
    }
}

/// Drives a [`SearchApi`] until the window is covered.
#[derive(Debug)]
pub struct Collector<A> {
    api: A,
}

impl<A> Collector<A>
where
    A: SearchApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Collect every in-window item for `criteria`.
    ///
    /// Items with an unparseable timestamp are skipped with a warning. Items
    /// newer than the window are skipped. The first item older than the
    /// window stops the run when results are date-sorted; with relevance
    /// sorting it is only skipped.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] if the first page cannot be fetched. Later
    /// failures end the run with [`StopReason::FetchFailed`].
    #[instrument(level = "info", skip_all, fields(query = %criteria.query(), start = %criteria.start(), end = %criteria.end()))]
    pub async fn collect<O>(
        &self,
        criteria: &SearchCriteria,
        observer: &mut O,
    ) -> Result<Collection, FetchError>
    where
        O: RecordObserver + ?Sized,
    {
        let page_size = criteria.page_size();
        let cutoff_applies = criteria.sort().is_date_descending();
        let mut records = Vec::new();
        let mut offset = 1usize;
        let mut pages_fetched = 0usize;

        let stop = loop {
            let batch = match self.api.fetch_page(criteria, offset).await {
                Ok(batch) => batch,
                Err(e) if pages_fetched == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        offset,
                        collected = records.len(),
                        error = %e,
                        "Fetch failed mid-run; keeping partial results"
                    );
                    break StopReason::FetchFailed(e);
                }
            };
            pages_fetched += 1;

            if batch.is_empty() {
                break StopReason::Exhausted;
            }

            let batch_len = batch.len();
            let mut cutoff = false;

            for item in batch {
                let published = match parse_pub_date(&item.pub_date) {
                    Ok(published) => published,
                    Err(e) => {
                        warn!(
                            error = %e,
                            title = %truncate_for_log(&item.title, 80),
                            "Skipping item with unparseable pubDate"
                        );
                        continue;
                    }
                };

                match criteria.position_of(publication_date(&published)) {
                    WindowPosition::Before if cutoff_applies => {
                        debug!(pub_date = %item.pub_date, "Reached items older than the window");
                        cutoff = true;
                        break;
                    }
                    WindowPosition::Before | WindowPosition::After => continue,
                    WindowPosition::Within => {
                        let record = normalize(item, published);
                        observer.on_record(&record);
                        records.push(record);
                    }
                }
            }

            debug!(offset, batch_len, collected = records.len(), "Processed page");

            if cutoff {
                break StopReason::CutoffReached;
            }
            if batch_len < page_size {
                break StopReason::ShortPage;
            }
            offset += page_size;
        };

        info!(
            count = records.len(),
            pages = pages_fetched,
            stop = ?stop,
            "Collection finished"
        );

        Ok(Collection {
            records,
            stop,
            pages_fetched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawItem, SortOrder};
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory search API keyed by page offset. Unknown offsets are empty.
    #[derive(Default)]
    struct FakeApi {
        pages: HashMap<usize, Vec<RawItem>>,
        failures: HashMap<usize, u16>,
        calls: RefCell<Vec<usize>>,
    }

    impl FakeApi {
        fn page(mut self, start: usize, items: Vec<RawItem>) -> Self {
            self.pages.insert(start, items);
            self
        }

        fn fail(mut self, start: usize, status: u16) -> Self {
            self.failures.insert(start, status);
            self
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.borrow().clone()
        }
    }

    impl SearchApi for &FakeApi {
        async fn fetch_page(
            &self,
            _criteria: &SearchCriteria,
            start: usize,
        ) -> Result<Vec<RawItem>, FetchError> {
            self.calls.borrow_mut().push(start);
            if let Some(status) = self.failures.get(&start) {
                return Err(FetchError::Status {
                    status: *status,
                    body: "boom".to_string(),
                });
            }
            Ok(self.pages.get(&start).cloned().unwrap_or_default())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stamp(day: NaiveDate) -> String {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        kst.from_local_datetime(&day.and_hms_opt(10, 15, 0).unwrap())
            .single()
            .unwrap()
            .format("%a, %d %b %Y %H:%M:%S %z")
            .to_string()
    }

    fn item_on(day: NaiveDate, title: &str) -> RawItem {
        RawItem {
            title: format!("<b>Yanolja</b> {title}"),
            original_link: format!("https://press.example.com/{title}"),
            link: format!("https://n.news.naver.com/{title}"),
            description: format!("About {title}"),
            pub_date: stamp(day),
        }
    }

    fn april(page_size: usize) -> SearchCriteria {
        SearchCriteria::new("Yanolja", date(2025, 4, 1), date(2025, 4, 30), page_size, SortOrder::Date)
            .unwrap()
    }

    fn titles(collection: &Collection) -> Vec<&str> {
        collection.records.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_page_continues_to_next_offset() {
        // 100 items spread from Apr 10 down to Apr 5.
        let first: Vec<RawItem> = (0..100)
            .map(|i| item_on(date(2025, 4, 10) - Duration::days(i / 17), &format!("a{i}")))
            .collect();
        let second = vec![item_on(date(2025, 4, 4), "b0"), item_on(date(2025, 4, 3), "b1")];
        let api = FakeApi::default().page(1, first).page(101, second);

        let collection = Collector::new(&api)
            .collect(&april(100), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(api.calls(), vec![1, 101]);
        assert_eq!(collection.records.len(), 102);
        assert_eq!(collection.pages_fetched, 2);
        assert!(matches!(collection.stop, StopReason::ShortPage));
    }

    #[tokio::test]
    async fn test_start_date_is_inclusive_and_day_before_cuts_off() {
        let page = vec![
            item_on(date(2025, 4, 2), "keep-a"),
            item_on(date(2025, 4, 1), "keep-b"),
            item_on(date(2025, 3, 31), "old"),
            item_on(date(2025, 4, 1), "after-cutoff"),
        ];
        let api = FakeApi::default().page(1, page).page(5, vec![item_on(date(2025, 4, 1), "x")]);

        let collection = Collector::new(&api)
            .collect(&april(4), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(titles(&collection), vec!["Yanolja keep-a", "Yanolja keep-b"]);
        assert!(matches!(collection.stop, StopReason::CutoffReached));
        assert_eq!(api.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_items_after_end_are_skipped_without_stopping() {
        let page = vec![
            item_on(date(2025, 5, 3), "future-a"),
            item_on(date(2025, 5, 1), "future-b"),
            item_on(date(2025, 4, 30), "end-day"),
            item_on(date(2025, 4, 20), "mid"),
        ];
        let api = FakeApi::default().page(1, page);

        let collection = Collector::new(&api)
            .collect(&april(10), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(titles(&collection), vec!["Yanolja end-day", "Yanolja mid"]);
        assert!(matches!(collection.stop, StopReason::ShortPage));
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_empty_collection() {
        let api = FakeApi::default();

        let collection = Collector::new(&api)
            .collect(&april(100), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert!(collection.records.is_empty());
        assert!(matches!(collection.stop, StopReason::Exhausted));
        assert_eq!(api.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_empty_later_page_is_exhausted() {
        let page = vec![item_on(date(2025, 4, 9), "a"), item_on(date(2025, 4, 8), "b")];
        let api = FakeApi::default().page(1, page);

        let collection = Collector::new(&api)
            .collect(&april(2), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(collection.records.len(), 2);
        assert!(matches!(collection.stop, StopReason::Exhausted));
        assert_eq!(api.calls(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_unparseable_pub_date_is_skipped() {
        let mut broken = item_on(date(2025, 4, 9), "broken");
        broken.pub_date = "yesterday".to_string();
        let page = vec![item_on(date(2025, 4, 10), "ok-a"), broken, item_on(date(2025, 4, 8), "ok-b")];
        let api = FakeApi::default().page(1, page);

        let collection = Collector::new(&api)
            .collect(&april(10), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(titles(&collection), vec!["Yanolja ok-a", "Yanolja ok-b"]);
    }

    #[tokio::test]
    async fn test_first_page_failure_propagates() {
        let api = FakeApi::default().fail(1, 401);

        let err = Collector::new(&api)
            .collect(&april(10), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_partial_results() {
        let page = vec![item_on(date(2025, 4, 9), "a"), item_on(date(2025, 4, 8), "b")];
        let api = FakeApi::default().page(1, page).fail(3, 500);

        let collection = Collector::new(&api)
            .collect(&april(2), &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(collection.records.len(), 2);
        assert!(collection.is_partial());
        assert!(matches!(
            collection.stop,
            StopReason::FetchFailed(FetchError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_similarity_sort_skips_old_items_without_cutoff() {
        let criteria =
            SearchCriteria::new("Yanolja", date(2025, 4, 1), date(2025, 4, 30), 10, SortOrder::Similarity)
                .unwrap();
        let page = vec![
            item_on(date(2025, 3, 1), "old"),
            item_on(date(2025, 4, 15), "in"),
            item_on(date(2025, 6, 1), "new"),
        ];
        let api = FakeApi::default().page(1, page);

        let collection = Collector::new(&api)
            .collect(&criteria, &mut |_: &NormalizedRecord| {})
            .await
            .unwrap();

        assert_eq!(titles(&collection), vec!["Yanolja in"]);
        assert!(matches!(collection.stop, StopReason::ShortPage));
    }

    #[tokio::test]
    async fn test_observer_sees_each_accepted_record() {
        let page = vec![
            item_on(date(2025, 5, 2), "skipped"),
            item_on(date(2025, 4, 9), "a"),
            item_on(date(2025, 4, 8), "b"),
        ];
        let api = FakeApi::default().page(1, page);
        let mut seen = Vec::new();

        let collection = Collector::new(&api)
            .collect(&april(10), &mut |r: &NormalizedRecord| seen.push(r.title.clone()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["Yanolja a", "Yanolja b"]);
        assert_eq!(collection.records.len(), seen.len());
    }

    #[tokio::test]
    async fn test_console_reporter_counts() {
        let page = vec![item_on(date(2025, 4, 9), "a"), item_on(date(2025, 4, 8), "b")];
        let api = FakeApi::default().page(1, page);
        let mut reporter = ConsoleReporter::new();

        Collector::new(&api).collect(&april(10), &mut reporter).await.unwrap();

        assert_eq!(reporter.count(), 2);
    }

    #[tokio::test]
    async fn test_collect_is_idempotent() {
        let first: Vec<RawItem> = (0..3).map(|i| item_on(date(2025, 4, 20 - i), &format!("p1-{i}"))).collect();
        let second = vec![item_on(date(2025, 4, 2), "p2-0"), item_on(date(2025, 3, 30), "p2-old")];
        let api = FakeApi::default().page(1, first).page(4, second);
        let collector = Collector::new(&api);
        let criteria = april(3);

        let a = collector.collect(&criteria, &mut |_: &NormalizedRecord| {}).await.unwrap();
        let b = collector.collect(&criteria, &mut |_: &NormalizedRecord| {}).await.unwrap();

        assert_eq!(a.records, b.records);
        assert_eq!(a.records.len(), 4);
        assert!(matches!(b.stop, StopReason::CutoffReached));
    }
}
