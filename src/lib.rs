//! # stockview
//!
//! Warehouse stock board: location-level stock rows grouped into paginated
//! cards, served over HTTP on the `may` runtime and shown on a rotating
//! display board.
//!
//! - [`engine::StockEngine`] runs the group, location and count phases against
//!   a [`store::StockStore`] (PostgreSQL or in-memory)
//! - [`http`] serves `/api/getData`, `/health` and `/metrics`
//! - [`display`] keeps a rotating, search-aware board in sync with the service

pub mod assemble;
pub mod client;
pub mod config;
pub mod connection;
pub mod display;
pub mod engine;
pub mod error;
pub mod executor;
pub mod http;
pub mod metrics;
pub mod model;
pub mod pagination;
pub mod pool;
pub mod query;
pub mod seed;
pub mod store;

pub use config::ServiceConfig;
pub use connection::{connect, ConnectionError};
pub use engine::StockEngine;
pub use error::StockError;
pub use executor::{PgExecutor, RowExecutor};
pub use model::{AggregatedItem, GroupKey, GroupingMode, LocationRecord, PageResult, StockGroup, StockRow};
pub use store::{MemoryStore, PgStockStore, StockStore};
