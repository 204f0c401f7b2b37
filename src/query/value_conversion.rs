//! Value conversion utilities for SeaQuery to may_postgres.
//!
//! The conversion follows a two-pass pattern:
//! 1. First pass: collect all values into typed vectors
//! 2. Second pass: create references to the stored values
//!
//! This pattern ensures that references remain valid within the closure scope.

use crate::error::StockError;
use may_postgres::types::ToSql;
use sea_query::{Value, Values};

/// Convert SeaQuery values to may_postgres `ToSql` parameters and run `f` with them.
///
/// Only the value kinds the stock planner produces are supported: strings for
/// search patterns and key members, integers for the page window, and nulls.
///
/// # Errors
///
/// Returns `StockError::Query` if an unsupported value type is encountered or
/// an unsigned value does not fit into `i64`.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, StockError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, StockError>,
{
    let mut ints: Vec<i32> = Vec::new();
    let mut big_ints: Vec<i64> = Vec::new();
    let mut strings: Vec<String> = Vec::new();
    let mut doubles: Vec<f64> = Vec::new();
    let mut nulls: Vec<Option<String>> = Vec::new();

    // First pass: collect all values into typed vectors
    for value in values.iter() {
        match value {
            Value::String(Some(s)) => strings.push(s.clone()),
            Value::Int(Some(i)) => ints.push(*i),
            Value::SmallInt(Some(i)) => ints.push(i32::from(*i)),
            Value::BigInt(Some(i)) => big_ints.push(*i),
            Value::Unsigned(Some(u)) => big_ints.push(i64::from(*u)),
            Value::BigUnsigned(Some(u)) => {
                let v = i64::try_from(*u).map_err(|_| {
                    StockError::Query(format!(
                        "BigUnsigned value {u} exceeds i64::MAX, cannot be bound"
                    ))
                })?;
                big_ints.push(v);
            }
            Value::Double(Some(d)) => doubles.push(*d),
            Value::String(None)
            | Value::Int(None)
            | Value::SmallInt(None)
            | Value::BigInt(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Double(None) => nulls.push(None),
            _ => {
                return Err(StockError::Query(format!(
                    "Unsupported value type in query: {value:?}"
                )));
            }
        }
    }

    // Second pass: create references to the stored values
    let mut int_idx = 0;
    let mut big_int_idx = 0;
    let mut string_idx = 0;
    let mut double_idx = 0;
    let mut null_idx = 0;

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(values.iter().count());

    for value in values.iter() {
        match value {
            Value::String(Some(_)) => {
                params.push(&strings[string_idx] as &dyn ToSql);
                string_idx += 1;
            }
            Value::Int(Some(_)) | Value::SmallInt(Some(_)) => {
                params.push(&ints[int_idx] as &dyn ToSql);
                int_idx += 1;
            }
            Value::BigInt(Some(_)) | Value::Unsigned(Some(_)) | Value::BigUnsigned(Some(_)) => {
                params.push(&big_ints[big_int_idx] as &dyn ToSql);
                big_int_idx += 1;
            }
            Value::Double(Some(_)) => {
                params.push(&doubles[double_idx] as &dyn ToSql);
                double_idx += 1;
            }
            _ => {
                params.push(&nulls[null_idx] as &dyn ToSql);
                null_idx += 1;
            }
        }
    }

    // Execute closure with the parameters (references are valid within closure scope)
    f(&params)
}
