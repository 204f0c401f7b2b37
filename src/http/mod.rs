//! HTTP surface: `/api/getData`, `/health` and `/metrics`.

pub mod params;
pub mod response;
pub mod service;

#[doc(inline)]
pub use params::PageQuery;
#[doc(inline)]
pub use response::ApiResponse;
#[doc(inline)]
pub use service::{serve, StockService};
