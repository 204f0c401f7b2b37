//! Stock data model.
//!
//! The row store holds one row per physical location (`StockRow`). The engine
//! groups those rows into cards (`AggregatedItem`), each carrying the group's
//! descriptive attributes, its ordered locations and the summed quantity.
//!
//! Wire names are camelCase, matching the JSON served by `/api/getData`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Display value used when a location has no rack number.
pub const LOCATION_NOT_SPECIFIED: &str = "Not specified";

/// Which attributes identify one card. Chosen once per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One card per item code
    Item,
    /// One card per (item code, purchase order)
    #[default]
    ItemAndPo,
}

/// Grouping key of a card.
///
/// `po_number` is always `None` in [`GroupingMode::Item`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub item_code: String,
    pub po_number: Option<String>,
}

impl GroupKey {
    pub fn new(item_code: impl Into<String>, po_number: Option<String>) -> Self {
        Self {
            item_code: item_code.into(),
            po_number,
        }
    }

    /// Project the key onto a grouping mode.
    pub fn for_mode(mut self, mode: GroupingMode) -> Self {
        if mode == GroupingMode::Item {
            self.po_number = None;
        }
        self
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    /// Ascending item code, then purchase order with absent values last
    /// (PostgreSQL's default `NULLS LAST` for ascending order).
    fn cmp(&self, other: &Self) -> Ordering {
        self.item_code
            .cmp(&other.item_code)
            .then_with(|| cmp_nulls_last(self.po_number.as_deref(), other.po_number.as_deref()))
    }
}

pub(crate) fn cmp_nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Grouping key plus the descriptive attributes shown on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockGroup {
    pub item_code: String,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub inspection_status: Option<String>,
}

impl StockGroup {
    pub fn new(item_code: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into(),
            po_number: None,
            buyer_name: None,
            uom: None,
            supplier_name: None,
            inspection_status: None,
        }
    }

    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.item_code.clone(), self.po_number.clone())
    }
}

/// One physical location holding part of a group's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(default)]
    pub bar_code: Option<String>,
    #[serde(default)]
    pub rack_no: Option<String>,
    #[serde(default)]
    pub shelf_no: Option<String>,
    #[serde(default)]
    pub stock_location: Option<String>,
    pub qty: f64,
    #[serde(default)]
    pub received_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub invoice_no: Option<String>,
    pub full_location: String,
}

impl LocationRecord {
    /// Build a record, deriving `full_location` and sanitising the quantity.
    pub fn new(
        bar_code: Option<String>,
        rack_no: Option<String>,
        shelf_no: Option<String>,
        stock_location: Option<String>,
        qty: Option<f64>,
        received_date: Option<NaiveDateTime>,
        invoice_no: Option<String>,
    ) -> Self {
        let full_location = full_location(
            stock_location.as_deref(),
            rack_no.as_deref(),
            shelf_no.as_deref(),
        );
        Self {
            bar_code,
            rack_no,
            shelf_no,
            stock_location,
            qty: sanitize_qty(qty),
            received_date,
            invoice_no,
            full_location,
        }
    }
}

/// `"{stockLocation}-{rackNo}-{shelfNo}"` when a rack number is present,
/// [`LOCATION_NOT_SPECIFIED`] otherwise.
pub fn full_location(stock_location: Option<&str>, rack_no: Option<&str>, shelf_no: Option<&str>) -> String {
    match rack_no.map(str::trim).filter(|r| !r.is_empty()) {
        Some(rack) => format!(
            "{}-{}-{}",
            stock_location.unwrap_or_default(),
            rack,
            shelf_no.unwrap_or_default()
        ),
        None => LOCATION_NOT_SPECIFIED.to_string(),
    }
}

/// Missing and non-finite quantities count as zero.
pub fn sanitize_qty(qty: Option<f64>) -> f64 {
    match qty {
        Some(q) if q.is_finite() => q,
        _ => 0.0,
    }
}

/// Parse a textual quantity; blanks and garbage count as zero.
pub fn coerce_qty(raw: Option<&str>) -> f64 {
    sanitize_qty(raw.and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Parse the date formats found in stock exports: ISO timestamps with `T` or a
/// space, with or without fractional seconds, or a bare date (midnight).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

/// Location row produced by the location phase, before assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub key: GroupKey,
    pub record: LocationRecord,
}

/// A card: group attributes, its locations and their summed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedItem {
    #[serde(flatten)]
    pub group: StockGroup,
    pub locations: Vec<LocationRecord>,
    pub total_qty: f64,
}

impl AggregatedItem {
    /// Received date of the first listed location (shown in the card footer).
    pub fn first_received(&self) -> Option<NaiveDateTime> {
        self.locations.first().and_then(|l| l.received_date)
    }
}

/// One page of cards plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub items: Vec<AggregatedItem>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl PageResult {
    pub fn empty(total_count: u64, page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count,
            page,
            page_size,
        }
    }
}

/// One flat row of the stock view.
///
/// Quantity is kept as source text so that CSV exports and hand-built rows go
/// through the same coercion as database values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(rename = "ITEM_CODE")]
    pub item_code: String,
    #[serde(rename = "FAB_PO_NO", default)]
    pub po_number: Option<String>,
    #[serde(rename = "BUYER_NAME", default)]
    pub buyer_name: Option<String>,
    #[serde(rename = "UOM", default)]
    pub uom: Option<String>,
    #[serde(rename = "MATERIAL_SUPPLIER_NAME", default)]
    pub supplier_name: Option<String>,
    #[serde(rename = "INSPECTION_STATUS", default)]
    pub inspection_status: Option<String>,
    #[serde(rename = "BAR_CODE", default)]
    pub bar_code: Option<String>,
    #[serde(rename = "MLS_RACK_NO", default)]
    pub rack_no: Option<String>,
    #[serde(rename = "MLS_SHELF_NO", default)]
    pub shelf_no: Option<String>,
    #[serde(rename = "STOCK_LOCATION", default)]
    pub stock_location: Option<String>,
    #[serde(rename = "MLS_QTY", default)]
    pub qty: Option<String>,
    #[serde(rename = "RECEIVED_DATE", default, deserialize_with = "lenient_datetime")]
    pub received_date: Option<NaiveDateTime>,
    #[serde(rename = "INVOICE_NO", default)]
    pub invoice_no: Option<String>,
}

impl StockRow {
    pub fn new(item_code: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into(),
            ..Self::default()
        }
    }

    pub fn po(mut self, po_number: impl Into<String>) -> Self {
        self.po_number = Some(po_number.into());
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier_name = Some(supplier.into());
        self
    }

    pub fn buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer_name = Some(buyer.into());
        self
    }

    pub fn bar_code(mut self, bar_code: impl Into<String>) -> Self {
        self.bar_code = Some(bar_code.into());
        self
    }

    pub fn location(mut self, stock_location: &str, rack: &str, shelf: &str) -> Self {
        self.stock_location = Some(stock_location.to_string());
        self.rack_no = Some(rack.to_string());
        self.shelf_no = Some(shelf.to_string());
        self
    }

    pub fn qty(mut self, qty: f64) -> Self {
        self.qty = Some(qty.to_string());
        self
    }

    pub fn raw_qty(mut self, raw: impl Into<String>) -> Self {
        self.qty = Some(raw.into());
        self
    }

    pub fn key(&self, mode: GroupingMode) -> GroupKey {
        GroupKey::new(self.item_code.clone(), self.po_number.clone()).for_mode(mode)
    }

    pub fn to_location(&self, mode: GroupingMode) -> LocationRow {
        LocationRow {
            key: self.key(mode),
            record: LocationRecord::new(
                self.bar_code.clone(),
                self.rack_no.clone(),
                self.shelf_no.clone(),
                self.stock_location.clone(),
                Some(coerce_qty(self.qty.as_deref())),
                self.received_date,
                self.invoice_no.clone(),
            ),
        }
    }
}
