//! Row store access.
//!
//! The engine never sees SQL or rows: it asks a [`StockStore`] for a
//! [`StockReader`] (one per request) and runs the group, location and count
//! phases through it. Dropping the reader ends the request's hold on the
//! store, so a pooled connection goes back to the pool on every exit path.

pub mod memory;
pub mod pg;
pub(crate) mod row;

use crate::error::StockError;
use crate::model::{GroupKey, GroupingMode, LocationRow, StockGroup};
use crate::query::SearchFilter;

#[doc(inline)]
pub use memory::MemoryStore;
#[doc(inline)]
pub use pg::PgStockStore;

/// Source of stock rows for the engine.
pub trait StockStore: Send + Sync {
    /// Per-request handle running the three query phases.
    type Reader<'a>: StockReader
    where
        Self: 'a;

    /// Grouping mode the store was configured with.
    fn mode(&self) -> GroupingMode;

    /// Start a request.
    ///
    /// # Errors
    ///
    /// Returns `StockError::Connection` when the store cannot be reached.
    fn reader(&self) -> Result<Self::Reader<'_>, StockError>;

    /// Liveness probe used by `/health`.
    fn check_health(&self) -> Result<bool, StockError>;
}

/// The three query shapes of a page fetch.
pub trait StockReader {
    /// Group phase: one group per key matching `filter`, ordered by key with
    /// absent purchase orders last, bounded by the page window.
    fn fetch_groups(
        &mut self,
        filter: &SearchFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<StockGroup>, StockError>;

    /// Location phase: every location row whose key is in `keys`, ordered by
    /// item code, purchase order and bar code.
    fn fetch_locations(&mut self, keys: &[GroupKey]) -> Result<Vec<LocationRow>, StockError>;

    /// Count phase: number of keys matching `filter`.
    fn count_groups(&mut self, filter: &SearchFilter) -> Result<u64, StockError>;
}
