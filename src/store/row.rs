//! Tolerant decoding of stock view rows.
//!
//! The view is maintained outside this service and its column types drift
//! between deployments (quantities as `NUMERIC`, `DOUBLE` or text, dates as
//! `TIMESTAMP`, `DATE` or text). Each getter tries the plausible SQL types in
//! turn; a quantity or date that cannot be read in any of them is treated as
//! absent rather than failing the page.

use crate::error::StockError;
use crate::model::{coerce_qty, parse_datetime, sanitize_qty, GroupKey, GroupingMode, LocationRecord, LocationRow, StockGroup};
use crate::query::StockColumn;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use may_postgres::Row;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Text column, also accepting numeric columns (codes stored as numbers).
pub(crate) fn text(row: &Row, col: StockColumn) -> Result<Option<String>, StockError> {
    let name = col.as_str();
    if let Ok(v) = row.try_get::<_, Option<String>>(name) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<_, Option<i32>>(name) {
        return Ok(v.map(|n| n.to_string()));
    }
    if let Ok(v) = row.try_get::<_, Option<i64>>(name) {
        return Ok(v.map(|n| n.to_string()));
    }
    if let Ok(v) = row.try_get::<_, Option<Decimal>>(name) {
        return Ok(v.map(|n| n.normalize().to_string()));
    }
    row.try_get::<_, Option<f64>>(name)
        .map(|v| v.map(|n| n.to_string()))
        .map_err(|e| StockError::Parse(format!("column {name}: {e}")))
}

/// Quantity column; unreadable values count as zero.
pub(crate) fn qty(row: &Row) -> f64 {
    let name = StockColumn::Qty.as_str();
    if let Ok(v) = row.try_get::<_, Option<f64>>(name) {
        return sanitize_qty(v);
    }
    if let Ok(v) = row.try_get::<_, Option<Decimal>>(name) {
        return sanitize_qty(v.and_then(|d| d.to_f64()));
    }
    if let Ok(v) = row.try_get::<_, Option<f32>>(name) {
        return sanitize_qty(v.map(f64::from));
    }
    if let Ok(v) = row.try_get::<_, Option<i32>>(name) {
        return sanitize_qty(v.map(f64::from));
    }
    if let Ok(v) = row.try_get::<_, Option<i64>>(name) {
        return sanitize_qty(v.map(|n| n as f64));
    }
    match row.try_get::<_, Option<String>>(name) {
        Ok(v) => coerce_qty(v.as_deref()),
        Err(e) => {
            log::debug!("unreadable {name}, counting as 0: {e}");
            0.0
        }
    }
}

/// Received date column; unreadable values are absent.
pub(crate) fn received_date(row: &Row) -> Option<NaiveDateTime> {
    let name = StockColumn::ReceivedDate.as_str();
    if let Ok(v) = row.try_get::<_, Option<NaiveDateTime>>(name) {
        return v;
    }
    if let Ok(v) = row.try_get::<_, Option<NaiveDate>>(name) {
        return v.and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    if let Ok(v) = row.try_get::<_, Option<DateTime<Utc>>>(name) {
        return v.map(|dt| dt.naive_utc());
    }
    row.try_get::<_, Option<String>>(name)
        .ok()
        .flatten()
        .as_deref()
        .and_then(parse_datetime)
}

fn key(row: &Row, mode: GroupingMode) -> Result<GroupKey, StockError> {
    let item_code = text(row, StockColumn::ItemCode)?
        .filter(|code| !code.is_empty())
        .ok_or_else(|| StockError::Parse("row without ITEM_CODE".to_string()))?;
    let po_number = match mode {
        GroupingMode::Item => None,
        GroupingMode::ItemAndPo => text(row, StockColumn::PoNumber)?,
    };
    Ok(GroupKey::new(item_code, po_number))
}

/// Decode a group phase row.
pub(crate) fn group(row: &Row, mode: GroupingMode) -> Result<StockGroup, StockError> {
    let key = key(row, mode)?;
    Ok(StockGroup {
        item_code: key.item_code,
        po_number: key.po_number,
        buyer_name: text(row, StockColumn::BuyerName)?,
        uom: text(row, StockColumn::Uom)?,
        supplier_name: text(row, StockColumn::SupplierName)?,
        inspection_status: text(row, StockColumn::InspectionStatus)?,
    })
}

/// Decode a location phase row.
pub(crate) fn location(row: &Row, mode: GroupingMode) -> Result<LocationRow, StockError> {
    Ok(LocationRow {
        key: key(row, mode)?,
        record: LocationRecord::new(
            text(row, StockColumn::BarCode)?,
            text(row, StockColumn::RackNo)?,
            text(row, StockColumn::ShelfNo)?,
            text(row, StockColumn::StockLocation)?,
            Some(qty(row)),
            received_date(row),
            text(row, StockColumn::InvoiceNo)?,
        ),
    })
}

/// Decode the count phase row (`COUNT(*)` is `BIGINT`).
pub(crate) fn count(row: &Row) -> Result<u64, StockError> {
    let total: i64 = row
        .try_get("total")
        .map_err(|e| StockError::Parse(format!("count: {e}")))?;
    u64::try_from(total).map_err(|_| StockError::Parse(format!("negative count {total}")))
}
