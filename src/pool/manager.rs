//! Pool manager with semaphore-based acquisition.

use crate::error::StockError;
use may::sync::Semphore;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Opens a new connection for an empty slot.
pub type ConnectionFactory<C> = Box<dyn Fn() -> Result<C, StockError> + Send + Sync>;

/// Bounded pool of connections of type `C`.
pub struct Pool<C> {
    idle: Mutex<Vec<C>>,
    permits: Semphore,
    factory: ConnectionFactory<C>,
    max_size: usize,
    acquire_timeout: Duration,
}

impl<C> Pool<C> {
    /// Create a pool with `max_size` slots (at least one).
    pub fn new(max_size: usize, acquire_timeout: Duration, factory: ConnectionFactory<C>) -> Self {
        let max_size = max_size.max(1);
        Self {
            idle: Mutex::new(Vec::with_capacity(max_size)),
            permits: Semphore::new(max_size),
            factory,
            max_size,
            acquire_timeout,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Connections currently parked in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle_slots().len()
    }

    /// Take a connection, waiting up to the acquire timeout for a free slot.
    ///
    /// # Errors
    ///
    /// Returns `StockError::Connection` when no slot frees up in time or a new
    /// connection cannot be opened. The slot is given back in both cases.
    pub fn acquire(&self) -> Result<PooledConnection<'_, C>, StockError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::acquire_connection_span().entered();

        let start = Instant::now();
        if !self.permits.wait_timeout(self.acquire_timeout) {
            log::warn!(
                "no pooled connection available after {:?} ({} slots)",
                self.acquire_timeout,
                self.max_size
            );
            return Err(StockError::Connection(format!(
                "timed out after {:?} waiting for a pooled connection",
                self.acquire_timeout
            )));
        }

        #[cfg(feature = "metrics")]
        METRICS.observe_pool_wait(start.elapsed());
        log::trace!("pool slot acquired in {:?}", start.elapsed());

        let parked = self.idle_slots().pop();
        let conn = match parked {
            Some(conn) => conn,
            None => match (self.factory)() {
                Ok(conn) => conn,
                Err(err) => {
                    self.permits.post();
                    return Err(err);
                }
            },
        };

        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
            broken: false,
        })
    }

    fn idle_slots(&self) -> MutexGuard<'_, Vec<C>> {
        // The idle list stays consistent even if a holder panicked.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, conn: Option<C>) {
        if let Some(conn) = conn {
            self.idle_slots().push(conn);
        }
        self.permits.post();
    }
}

/// A connection on loan from a [`Pool`]; returned to the pool on drop.
pub struct PooledConnection<'a, C> {
    pool: &'a Pool<C>,
    conn: Option<C>,
    broken: bool,
}

impl<C> PooledConnection<'_, C> {
    /// Drop the connection instead of parking it (e.g. after a connection-level failure).
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }
}

impl<C> Deref for PooledConnection<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        // Only `Drop` takes the connection out.
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl<C> Drop for PooledConnection<'_, C> {
    fn drop(&mut self) {
        let conn = self.conn.take();
        if self.broken {
            log::debug!("discarding broken pooled connection");
            self.pool.release(None);
        } else {
            self.pool.release(conn);
        }
    }
}
