//! Connection pool.
//!
//! A fixed number of connection slots guarded by a coroutine-aware semaphore.
//! Connections are created lazily and handed out through [`PooledConnection`],
//! which returns them on drop, whatever path the request took.

pub mod manager;

#[doc(inline)]
pub use manager::{ConnectionFactory, Pool, PooledConnection};
