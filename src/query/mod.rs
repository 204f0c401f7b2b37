//! Query planning for page fetches.
//!
//! - **Column**: statically declared projection of the stock view
//! - **Filter**: the case-insensitive search predicate
//! - **Planner**: the group, location and count statements
//! - **Value Conversion**: SeaQuery `Value` to `ToSql` parameter conversion

pub mod column;
pub mod filter;
pub mod planner;
pub(crate) mod value_conversion;

#[doc(inline)]
pub use column::StockColumn;
#[doc(inline)]
pub use filter::SearchFilter;
#[doc(inline)]
pub use planner::{StockQueryPlanner, StockStatement};
