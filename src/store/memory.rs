//! In-memory store over a fixed set of rows.
//!
//! Evaluates the same three phases as the SQL store: blank item codes are
//! skipped, attributes are the per-key maximum (absent values ignored), keys
//! sort with absent purchase orders last.

use crate::error::StockError;
use crate::model::{cmp_nulls_last, GroupKey, GroupingMode, LocationRow, StockGroup, StockRow};
use crate::pagination;
use crate::query::SearchFilter;
use crate::store::{StockReader, StockStore};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
pub struct MemoryStore {
    rows: Vec<StockRow>,
    mode: GroupingMode,
}

impl MemoryStore {
    pub fn new(rows: Vec<StockRow>, mode: GroupingMode) -> Self {
        Self { rows, mode }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Groups matching `filter`, in key order.
    fn groups(&self, filter: &SearchFilter) -> BTreeMap<GroupKey, StockGroup> {
        let mut groups: BTreeMap<GroupKey, StockGroup> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| self.is_visible(r, filter)) {
            let key = row.key(self.mode);
            let group = groups.entry(key.clone()).or_insert_with(|| StockGroup {
                po_number: key.po_number.clone(),
                ..StockGroup::new(key.item_code.clone())
            });
            keep_max(&mut group.buyer_name, &row.buyer_name);
            keep_max(&mut group.uom, &row.uom);
            keep_max(&mut group.supplier_name, &row.supplier_name);
            keep_max(&mut group.inspection_status, &row.inspection_status);
        }
        groups
    }

    fn is_visible(&self, row: &StockRow, filter: &SearchFilter) -> bool {
        !row.item_code.is_empty() && filter.matches(&row.item_code, row.supplier_name.as_deref())
    }
}

/// SQL `MAX` over nullable text.
fn keep_max(current: &mut Option<String>, candidate: &Option<String>) {
    if let Some(candidate) = candidate {
        if current.as_ref().map_or(true, |c| candidate > c) {
            *current = Some(candidate.clone());
        }
    }
}

impl StockStore for MemoryStore {
    type Reader<'a> = &'a MemoryStore;

    fn mode(&self) -> GroupingMode {
        self.mode
    }

    fn reader(&self) -> Result<&MemoryStore, StockError> {
        Ok(self)
    }

    fn check_health(&self) -> Result<bool, StockError> {
        Ok(true)
    }
}

impl StockReader for &MemoryStore {
    fn fetch_groups(
        &mut self,
        filter: &SearchFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<StockGroup>, StockError> {
        let skip = usize::try_from(pagination::offset(page, page_size)).unwrap_or(usize::MAX);
        Ok(self
            .groups(filter)
            .into_values()
            .skip(skip)
            .take(page_size as usize)
            .collect())
    }

    fn fetch_locations(&mut self, keys: &[GroupKey]) -> Result<Vec<LocationRow>, StockError> {
        let wanted: HashSet<&GroupKey> = keys.iter().collect();
        let mut rows: Vec<&StockRow> = self
            .rows
            .iter()
            .filter(|r| !r.item_code.is_empty() && wanted.contains(&r.key(self.mode)))
            .collect();
        rows.sort_by(|a, b| {
            a.item_code
                .cmp(&b.item_code)
                .then_with(|| cmp_nulls_last(a.po_number.as_deref(), b.po_number.as_deref()))
                .then_with(|| cmp_nulls_last(a.bar_code.as_deref(), b.bar_code.as_deref()))
        });
        Ok(rows.into_iter().map(|r| r.to_location(self.mode)).collect())
    }

    fn count_groups(&mut self, filter: &SearchFilter) -> Result<u64, StockError> {
        Ok(self.groups(filter).len() as u64)
    }
}
