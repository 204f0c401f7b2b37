//! Page fetch: group phase, location phase, count phase, assembly.

use crate::assemble::assemble;
use crate::error::StockError;
use crate::model::{GroupKey, PageResult, StockGroup};
use crate::query::SearchFilter;
use crate::store::{StockReader, StockStore};
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Stock aggregation and pagination over a [`StockStore`].
pub struct StockEngine<S> {
    store: S,
}

impl<S: StockStore> StockEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch one page of cards.
    ///
    /// `page` and `page_size` are 1-based and must be at least 1; callers
    /// clamp user input before getting here. A page past the end is an empty
    /// result carrying the real total, not an error.
    ///
    /// # Errors
    ///
    /// `StockError::Connection` when the store is unreachable, `Query` or
    /// `Parse` when any phase fails. A failed phase fails the whole page.
    pub fn fetch_page(&self, search: &str, page: u32, page_size: u32) -> Result<PageResult, StockError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::fetch_page_span(search, page, page_size).entered();

        if page == 0 || page_size == 0 {
            return Err(StockError::Query(format!(
                "page and page size start at 1 (got page {page}, page size {page_size})"
            )));
        }

        let start = Instant::now();
        let filter = SearchFilter::new(search);
        let mut reader = self.store.reader()?;

        let groups = timed("groups", || reader.fetch_groups(&filter, page, page_size))?;
        let locations = if groups.is_empty() {
            Vec::new()
        } else {
            let keys: Vec<GroupKey> = groups.iter().map(StockGroup::key).collect();
            timed("locations", || reader.fetch_locations(&keys))?
        };
        let total_count = timed("count", || reader.count_groups(&filter))?;
        drop(reader);

        let items = assemble(groups, locations);
        log::debug!(
            "page {page} (size {page_size}, search {:?}): {} of {total_count} groups in {:?}",
            filter.term().unwrap_or_default(),
            items.len(),
            start.elapsed()
        );

        Ok(PageResult {
            items,
            total_count,
            page,
            page_size,
        })
    }

    pub fn check_health(&self) -> Result<bool, StockError> {
        self.store.check_health()
    }
}

fn timed<T>(phase: &'static str, run: impl FnOnce() -> Result<T, StockError>) -> Result<T, StockError> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::fetch_phase_span(phase).entered();

    let start = Instant::now();
    let result = run();
    #[cfg(feature = "metrics")]
    METRICS.record_phase(phase, start.elapsed());
    if let Err(err) = &result {
        log::warn!("{phase} phase failed after {:?}: {err}", start.elapsed());
    }
    result
}
