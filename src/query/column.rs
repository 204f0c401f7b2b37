//! Column identifiers of the stock view.
//!
//! The projection from the row schema to [`StockGroup`](crate::model::StockGroup)
//! and [`LocationRecord`](crate::model::LocationRecord) is declared here once;
//! nothing selects columns dynamically.

use crate::model::GroupingMode;
use sea_query::Iden;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StockColumn {
    ItemCode,
    PoNumber,
    BuyerName,
    Uom,
    SupplierName,
    InspectionStatus,
    BarCode,
    RackNo,
    ShelfNo,
    StockLocation,
    Qty,
    ReceivedDate,
    InvoiceNo,
}

impl StockColumn {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockColumn::ItemCode => "ITEM_CODE",
            StockColumn::PoNumber => "FAB_PO_NO",
            StockColumn::BuyerName => "BUYER_NAME",
            StockColumn::Uom => "UOM",
            StockColumn::SupplierName => "MATERIAL_SUPPLIER_NAME",
            StockColumn::InspectionStatus => "INSPECTION_STATUS",
            StockColumn::BarCode => "BAR_CODE",
            StockColumn::RackNo => "MLS_RACK_NO",
            StockColumn::ShelfNo => "MLS_SHELF_NO",
            StockColumn::StockLocation => "STOCK_LOCATION",
            StockColumn::Qty => "MLS_QTY",
            StockColumn::ReceivedDate => "RECEIVED_DATE",
            StockColumn::InvoiceNo => "INVOICE_NO",
        }
    }
}

impl Iden for StockColumn {
    fn unquoted(&self) -> &str {
        self.as_str()
    }
}

/// Columns forming the grouping key, in ordering precedence.
pub fn key_columns(mode: GroupingMode) -> &'static [StockColumn] {
    match mode {
        GroupingMode::Item => &[StockColumn::ItemCode],
        GroupingMode::ItemAndPo => &[StockColumn::ItemCode, StockColumn::PoNumber],
    }
}

/// Descriptive attributes reported once per group.
pub const ATTRIBUTE_COLUMNS: [StockColumn; 4] = [
    StockColumn::BuyerName,
    StockColumn::Uom,
    StockColumn::SupplierName,
    StockColumn::InspectionStatus,
];

/// Columns read by the location phase besides the key.
pub const LOCATION_COLUMNS: [StockColumn; 7] = [
    StockColumn::BarCode,
    StockColumn::RackNo,
    StockColumn::ShelfNo,
    StockColumn::StockLocation,
    StockColumn::Qty,
    StockColumn::ReceivedDate,
    StockColumn::InvoiceNo,
];
