//! Joins location rows onto their groups.

use crate::model::{AggregatedItem, GroupKey, LocationRecord, LocationRow, StockGroup};
use std::collections::HashMap;

/// Build one card per group, in group order.
///
/// Each card receives the locations whose key equals the group's key, in the
/// order they were given. Locations matching no group are dropped and groups
/// without locations get an empty list with a zero total.
pub fn assemble(groups: Vec<StockGroup>, locations: Vec<LocationRow>) -> Vec<AggregatedItem> {
    let mut by_key: HashMap<GroupKey, Vec<LocationRecord>> = HashMap::with_capacity(groups.len());
    for row in locations {
        by_key.entry(row.key).or_default().push(row.record);
    }

    groups
        .into_iter()
        .map(|group| {
            let locations = by_key.remove(&group.key()).unwrap_or_default();
            let total_qty = locations.iter().map(|l| l.qty).sum();
            AggregatedItem {
                group,
                locations,
                total_qty,
            }
        })
        .collect()
}
