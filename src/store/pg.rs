//! PostgreSQL-backed store.

use crate::connection::{connect, redact_connection_string, validate_connection_string};
use crate::error::StockError;
use crate::executor::{PgExecutor, RowExecutor};
use crate::model::{GroupKey, GroupingMode, LocationRow, StockGroup};
use crate::pool::{Pool, PooledConnection};
use crate::query::value_conversion::with_converted_params;
use crate::query::{SearchFilter, StockQueryPlanner, StockStatement};
use crate::store::{row, StockReader, StockStore};
use may_postgres::Row;
use std::sync::Arc;
use std::time::Duration;

/// Stock view in PostgreSQL, read through a connection pool.
pub struct PgStockStore {
    pool: Arc<Pool<PgExecutor>>,
    planner: StockQueryPlanner,
}

impl PgStockStore {
    pub fn new(pool: Arc<Pool<PgExecutor>>, planner: StockQueryPlanner) -> Self {
        Self { pool, planner }
    }

    /// Build a lazily connecting pool for `url`.
    ///
    /// # Errors
    ///
    /// Returns `StockError::Connection` if the connection string is malformed.
    /// No connection is opened until the first request.
    pub fn connect(
        url: &str,
        max_connections: usize,
        acquire_timeout: Duration,
        planner: StockQueryPlanner,
    ) -> Result<Self, StockError> {
        validate_connection_string(url)?;
        log::info!(
            "stock store: {} ({} connections)",
            redact_connection_string(url),
            max_connections
        );
        let url = url.to_string();
        let pool = Pool::new(
            max_connections,
            acquire_timeout,
            Box::new(move || Ok(PgExecutor::new(connect(&url)?))),
        );
        Ok(Self::new(Arc::new(pool), planner))
    }

    pub fn pool(&self) -> &Arc<Pool<PgExecutor>> {
        &self.pool
    }
}

impl StockStore for PgStockStore {
    type Reader<'a> = PgReader<'a>;

    fn mode(&self) -> GroupingMode {
        self.planner.mode()
    }

    fn reader(&self) -> Result<PgReader<'_>, StockError> {
        Ok(PgReader {
            conn: self.pool.acquire()?,
            planner: &self.planner,
        })
    }

    fn check_health(&self) -> Result<bool, StockError> {
        let mut conn = self.pool.acquire()?;
        let healthy = conn.check_health();
        if !matches!(healthy, Ok(true)) {
            conn.mark_broken();
        }
        healthy
    }
}

/// One request's hold on a pooled connection.
pub struct PgReader<'a> {
    conn: PooledConnection<'a, PgExecutor>,
    planner: &'a StockQueryPlanner,
}

impl PgReader<'_> {
    fn checked<T>(&mut self, result: Result<T, StockError>) -> Result<T, StockError> {
        if let Err(err) = &result {
            if err.is_connection() {
                self.conn.mark_broken();
            }
        }
        result
    }
}

impl StockReader for PgReader<'_> {
    fn fetch_groups(
        &mut self,
        filter: &SearchFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<StockGroup>, StockError> {
        let result = fetch_groups(&*self.conn, self.planner, filter, page, page_size);
        self.checked(result)
    }

    fn fetch_locations(&mut self, keys: &[GroupKey]) -> Result<Vec<LocationRow>, StockError> {
        let result = fetch_locations(&*self.conn, self.planner, keys);
        self.checked(result)
    }

    fn count_groups(&mut self, filter: &SearchFilter) -> Result<u64, StockError> {
        let result = count_groups(&*self.conn, self.planner, filter);
        self.checked(result)
    }
}

fn run_all<E: RowExecutor>(executor: &E, stmt: &StockStatement) -> Result<Vec<Row>, StockError> {
    log::trace!("{}", stmt.sql);
    with_converted_params(&stmt.values, |params| executor.query_all(&stmt.sql, params))
}

pub(crate) fn fetch_groups<E: RowExecutor>(
    executor: &E,
    planner: &StockQueryPlanner,
    filter: &SearchFilter,
    page: u32,
    page_size: u32,
) -> Result<Vec<StockGroup>, StockError> {
    let rows = run_all(executor, &planner.group_page(filter, page, page_size))?;
    rows.iter().map(|r| row::group(r, planner.mode())).collect()
}

pub(crate) fn fetch_locations<E: RowExecutor>(
    executor: &E,
    planner: &StockQueryPlanner,
    keys: &[GroupKey],
) -> Result<Vec<LocationRow>, StockError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let rows = run_all(executor, &planner.locations(keys))?;
    rows.iter().map(|r| row::location(r, planner.mode())).collect()
}

pub(crate) fn count_groups<E: RowExecutor>(
    executor: &E,
    planner: &StockQueryPlanner,
    filter: &SearchFilter,
) -> Result<u64, StockError> {
    let stmt = planner.count(filter);
    log::trace!("{}", stmt.sql);
    let row = with_converted_params(&stmt.values, |params| executor.query_one(&stmt.sql, params))?;
    row::count(&row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::MockExecutor;

    fn planner() -> StockQueryPlanner {
        StockQueryPlanner::new("VIEW_MATERIAL_STOCK_COMBINED", GroupingMode::ItemAndPo)
    }

    #[test]
    fn test_fetch_groups_binds_search_and_window() {
        let executor = MockExecutor::default();
        let groups = fetch_groups(&executor, &planner(), &SearchFilter::new("abc"), 2, 8).unwrap();
        assert!(groups.is_empty());

        let sql = executor.get_captured_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("GROUP BY"), "{}", sql[0]);
        assert!(!sql[0].contains("abc"), "{}", sql[0]);
        // empty item code guard, two LIKE patterns, LIMIT, OFFSET
        assert_eq!(executor.get_captured_param_counts(), vec![5]);
    }

    #[test]
    fn test_fetch_locations_skips_empty_key_set() {
        let executor = MockExecutor::default();
        let rows = fetch_locations(&executor, &planner(), &[]).unwrap();
        assert!(rows.is_empty());
        assert!(executor.get_captured_sql().is_empty());
    }

    #[test]
    fn test_fetch_locations_binds_each_key() {
        let executor = MockExecutor::default();
        let keys = vec![
            GroupKey::new("F100", Some("PO-1".into())),
            GroupKey::new("F200", None),
        ];
        fetch_locations(&executor, &planner(), &keys).unwrap();
        assert_eq!(executor.get_captured_param_counts(), vec![3]);
    }

    #[test]
    fn test_count_uses_query_one() {
        let executor = MockExecutor::default();
        let err = count_groups(&executor, &planner(), &SearchFilter::none()).unwrap_err();
        assert!(matches!(err, StockError::Query(_)));
        assert!(executor.get_captured_sql()[0].starts_with("SELECT COUNT(*)"));
    }

    #[test]
    fn test_connection_failure_propagates() {
        let executor = MockExecutor::failing(StockError::Connection("connection closed".into()));
        let err = fetch_groups(&executor, &planner(), &SearchFilter::none(), 1, 8).unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn test_malformed_url_rejected_without_connecting() {
        let result = PgStockStore::connect("not a url", 2, Duration::from_millis(10), planner());
        assert!(matches!(result, Err(StockError::Connection(_))));
    }
}
