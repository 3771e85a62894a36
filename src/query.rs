//! List-view orchestration: server-side filtering, client-side
//! pagination, and per-row enrichment of the visible page.
//!
//! The server owns filtering and sort order; the controller owns the full
//! fetched set and only ever slices it. Filter changes replace the set
//! wholesale and reset to page 1. Each full fetch takes a ticket from a
//! monotonically increasing counter, and completions that are no longer
//! the newest are discarded, so rapid filter changes cannot resurface a
//! superseded result.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::notify::NotificationBus;

pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Backing store for one list view: the bulk fetch and the optional
/// per-row detail count (e.g. comment totals, which the bulk ticket
/// response does not include).
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Clone + Send + Sync + 'static;
    type Filters: Clone + Default + PartialEq + Send + Sync + 'static;

    /// Fetch the complete server-filtered, server-sorted result set.
    async fn fetch_all(&self, filters: &Self::Filters) -> Result<Vec<Self::Record>, ApiError>;

    /// Derived count for one row. Sources without an enrichment fetch
    /// keep the default.
    async fn enrich(&self, record: &Self::Record) -> Result<u64, ApiError> {
        let _ = record;
        Ok(0)
    }
}

/// A displayed row: the record plus its enrichment count.
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched<R> {
    pub record: R,
    pub detail_count: u64,
}

/// Snapshot of what a list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    pub rows: Vec<Enriched<R>>,
    pub page: usize,
    /// Clamp ceiling for the page index; 1 even when there are no
    /// records (an empty list shows "no results", not a page control).
    pub total_pages: usize,
    pub total_records: usize,
    pub loading: bool,
}

impl<R> PageView<R> {
    fn empty() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            total_pages: 1,
            total_records: 0,
            loading: false,
        }
    }
}

struct QueryState<S: RecordSource> {
    filters: S::Filters,
    full: Vec<S::Record>,
    page: usize,
    loading: bool,
    displayed: Vec<Enriched<S::Record>>,
    /// Bumped on every change to `full` or `page`; an enrichment pass
    /// only writes its result while the epoch it sliced under is still
    /// current.
    epoch: u64,
}

pub struct ListQuery<S: RecordSource> {
    source: S,
    bus: NotificationBus,
    page_size: usize,
    seq: AtomicU64,
    state: Mutex<QueryState<S>>,
    view: watch::Sender<PageView<S::Record>>,
}

impl<S: RecordSource> ListQuery<S> {
    pub fn new(source: S, bus: NotificationBus) -> Self {
        Self::with_page_size(source, bus, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: S, bus: NotificationBus, page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be positive");
        let (view, _) = watch::channel(PageView::empty());
        Self {
            source,
            bus,
            page_size,
            seq: AtomicU64::new(0),
            state: Mutex::new(QueryState {
                filters: S::Filters::default(),
                full: Vec::new(),
                page: 1,
                loading: false,
                displayed: Vec::new(),
                epoch: 0,
            }),
            view,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn filters(&self) -> S::Filters {
        self.state.lock().await.filters.clone()
    }

    /// What the view renders right now.
    pub fn snapshot(&self) -> PageView<S::Record> {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageView<S::Record>> {
        self.view.subscribe()
    }

    /// Merging filter update. A change triggers a full re-fetch and
    /// resets pagination; a mutation that leaves the filters equal does
    /// nothing.
    pub async fn set_filters(&self, apply: impl FnOnce(&mut S::Filters)) {
        let changed = {
            let mut state = self.state.lock().await;
            let mut next = state.filters.clone();
            apply(&mut next);
            if next == state.filters {
                false
            } else {
                state.filters = next;
                true
            }
        };
        if changed {
            self.refresh().await;
        }
    }

    /// Re-fetch the complete result set for the current filters.
    ///
    /// On success the set is replaced atomically; on failure it is
    /// cleared and the error surfaces on the notification bus — stale
    /// data is never displayed silently. Either way the page resets to 1
    /// and enrichment re-runs.
    pub async fn refresh(&self) {
        let (filters, ticket) = {
            let mut state = self.state.lock().await;
            state.loading = true;
            self.publish(&state);
            (
                state.filters.clone(),
                self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            )
        };

        let result = self.source.fetch_all(&filters).await;

        let mut state = self.state.lock().await;
        if self.seq.load(Ordering::SeqCst) != ticket {
            debug!("Discarding superseded list fetch #{}", ticket);
            return;
        }

        match result {
            Ok(records) => {
                info!("Fetched {} records", records.len());
                state.full = records;
            }
            Err(err) => {
                warn!("List fetch failed: {}", err);
                state.full.clear();
                self.bus.error(err.to_string());
            }
        }
        state.page = 1;
        state.loading = false;
        state.epoch += 1;

        let epoch = state.epoch;
        let slice = self.page_slice(&state);
        self.publish(&state);
        drop(state);

        self.enrich_slice(slice, epoch).await;
    }

    /// Advance one page, clamped to the last page. A no-op at the
    /// boundary.
    pub async fn next_page(&self) {
        self.turn_page(1).await;
    }

    /// Go back one page, clamped to page 1. A no-op at the boundary.
    pub async fn prev_page(&self) {
        self.turn_page(-1).await;
    }

    async fn turn_page(&self, delta: isize) {
        let turned = {
            let mut state = self.state.lock().await;
            let total = total_pages(state.full.len(), self.page_size);
            let target = state.page.saturating_add_signed(delta).clamp(1, total);
            if target == state.page {
                None
            } else {
                state.page = target;
                state.epoch += 1;
                let epoch = state.epoch;
                let slice = self.page_slice(&state);
                self.publish(&state);
                Some((slice, epoch))
            }
        };
        if let Some((slice, epoch)) = turned {
            self.enrich_slice(slice, epoch).await;
        }
    }

    /// Fetch the detail count for every row of the slice, concurrently
    /// and independently; a failed row defaults to zero rather than
    /// failing the page.
    async fn enrich_slice(&self, slice: Vec<S::Record>, epoch: u64) {
        let counts = join_all(slice.iter().map(|record| async move {
            match self.source.enrich(record).await {
                Ok(count) => count,
                Err(err) => {
                    warn!("Row enrichment failed, defaulting to 0: {}", err);
                    0
                }
            }
        }))
        .await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            debug!("Discarding enrichment for superseded page");
            return;
        }
        state.displayed = slice
            .into_iter()
            .zip(counts)
            .map(|(record, detail_count)| Enriched {
                record,
                detail_count,
            })
            .collect();
        self.publish(&state);
    }

    fn page_slice(&self, state: &QueryState<S>) -> Vec<S::Record> {
        let start = (state.page - 1) * self.page_size;
        state
            .full
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    fn publish(&self, state: &QueryState<S>) {
        self.view.send_replace(PageView {
            rows: state.displayed.clone(),
            page: state.page,
            total_pages: total_pages(state.full.len(), self.page_size),
            total_records: state.full.len(),
            loading: state.loading,
        });
    }
}

fn total_pages(count: usize, page_size: usize) -> usize {
    if count == 0 {
        1
    } else {
        count.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u64,
        comment_count: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct StubFilters {
        search: String,
        status: String,
    }

    /// Source returning a fixed set of rows, with configurable per-call
    /// delays, per-row enrichment failures, and whole-fetch failures.
    struct StubSource {
        rows: Vec<Row>,
        fail_fetch: bool,
        failing_enrichments: HashSet<u64>,
        fetch_delays: Vec<Duration>,
        fetch_calls: AtomicUsize,
    }

    impl StubSource {
        fn with_rows(count: u64) -> Self {
            Self {
                rows: (1..=count)
                    .map(|id| Row {
                        id,
                        comment_count: id * 10,
                    })
                    .collect(),
                fail_fetch: false,
                failing_enrichments: HashSet::new(),
                fetch_delays: Vec::new(),
                fetch_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordSource for StubSource {
        type Record = Row;
        type Filters = StubFilters;

        async fn fetch_all(&self, filters: &StubFilters) -> Result<Vec<Row>, ApiError> {
            let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.fetch_delays.get(call) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail_fetch {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            // Filtered size varies with the status filter so supersession
            // is observable.
            if filters.status == "closed" {
                return Ok(self.rows.iter().take(2).cloned().collect());
            }
            Ok(self.rows.clone())
        }

        async fn enrich(&self, record: &Row) -> Result<u64, ApiError> {
            if self.failing_enrichments.contains(&record.id) {
                return Err(ApiError::Http {
                    status: 500,
                    message: "count unavailable".to_string(),
                    detail: None,
                });
            }
            Ok(record.comment_count)
        }
    }

    fn query(source: StubSource) -> ListQuery<StubSource> {
        ListQuery::new(source, NotificationBus::new())
    }

    #[tokio::test]
    async fn test_pagination_clamps_and_slices() {
        let q = query(StubSource::with_rows(37));
        q.refresh().await;

        let view = q.snapshot();
        assert_eq!(view.total_records, 37);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.page, 1);
        assert_eq!(view.rows.len(), 15);

        q.next_page().await;
        assert_eq!(q.snapshot().page, 2);
        q.next_page().await;

        let view = q.snapshot();
        assert_eq!(view.page, 3);
        assert_eq!(view.rows.len(), 7, "Last page holds the remainder");

        // Clamped at the last page.
        q.next_page().await;
        assert_eq!(q.snapshot().page, 3);

        q.prev_page().await;
        q.prev_page().await;
        assert_eq!(q.snapshot().page, 1);
        q.prev_page().await;
        assert_eq!(q.snapshot().page, 1, "Clamped at page 1");
    }

    #[tokio::test]
    async fn test_rows_follow_source_order() {
        let q = query(StubSource::with_rows(20));
        q.refresh().await;
        q.next_page().await;

        let ids: Vec<u64> = q.snapshot().rows.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, (16..=20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_filter_change_resets_to_page_one() {
        let q = query(StubSource::with_rows(37));
        q.refresh().await;
        q.next_page().await;
        q.next_page().await;
        assert_eq!(q.snapshot().page, 3);

        q.set_filters(|f| f.search = "printer".to_string()).await;

        let view = q.snapshot();
        assert_eq!(view.page, 1);
        assert_eq!(view.total_records, 37);
    }

    #[tokio::test]
    async fn test_unchanged_filters_do_not_refetch() {
        let q = query(StubSource::with_rows(5));
        q.refresh().await;
        assert_eq!(q.source.fetch_calls.load(Ordering::SeqCst), 1);

        q.set_filters(|_| {}).await;
        q.set_filters(|f| f.search = String::new()).await;
        assert_eq!(q.source.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enrichment_failure_defaults_that_row_to_zero() {
        let mut source = StubSource::with_rows(5);
        source.failing_enrichments.insert(3);
        let q = query(source);
        q.refresh().await;

        let counts: Vec<u64> = q.snapshot().rows.iter().map(|r| r.detail_count).collect();
        assert_eq!(counts, vec![10, 20, 0, 40, 50]);
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_set_and_notifies() {
        let bus = NotificationBus::new();
        let mut source = StubSource::with_rows(10);
        source.fail_fetch = true;
        let q = ListQuery::new(source, bus.clone());
        q.refresh().await;

        let view = q.snapshot();
        assert_eq!(view.total_records, 0);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_pages, 1);

        let notes = bus.snapshot();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, crate::notify::NotificationKind::Error);
        assert!(notes[0].message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_empty_result_set_shows_single_empty_page() {
        let q = query(StubSource::with_rows(0));
        q.refresh().await;

        let view = q.snapshot();
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.page, 1);
        assert!(view.rows.is_empty());

        q.next_page().await;
        assert_eq!(q.snapshot().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_discarded() {
        let mut source = StubSource::with_rows(10);
        // First fetch resolves long after the second.
        source.fetch_delays = vec![Duration::from_secs(5), Duration::from_millis(10)];
        let q = query(source);

        tokio::join!(q.refresh(), async {
            // Let the first refresh take its ticket before superseding it.
            tokio::task::yield_now().await;
            q.set_filters(|f| f.status = "closed".to_string()).await;
        });

        let view = q.snapshot();
        assert_eq!(
            view.total_records, 2,
            "The newest fetch wins even though the older one resolved later"
        );
    }
}
