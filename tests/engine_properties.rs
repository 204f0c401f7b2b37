//! Page fetch properties over the in-memory store.

use std::collections::HashSet;
use stockview::model::{GroupKey, GroupingMode, StockRow};
use stockview::pagination::page_count;
use stockview::{MemoryStore, StockEngine};

/// 23 groups: 20 items with two locations each under a purchase order, plus
/// three items without one. Quantities include blanks and garbage.
fn rows() -> Vec<StockRow> {
    let mut rows = Vec::new();
    for i in 0..20 {
        let supplier = if i % 5 == 0 { "ABC Textiles" } else { "Northwind Fabrics" };
        rows.push(
            StockRow::new(format!("F{i:03}"))
                .po(format!("PO-{}", i % 4))
                .supplier(supplier)
                .bar_code(format!("B{i:03}-2"))
                .location("WH", "R1", "S1")
                .qty(f64::from(i) + 0.5),
        );
        rows.push(
            StockRow::new(format!("F{i:03}"))
                .po(format!("PO-{}", i % 4))
                .supplier(supplier)
                .bar_code(format!("B{i:03}-1"))
                .raw_qty(if i % 3 == 0 { "" } else { "abc" }),
        );
    }
    for code in ["XABC1", "Y200", "Z300"] {
        rows.push(StockRow::new(code).bar_code("B").qty(1.0));
    }
    rows
}

fn engine() -> StockEngine<MemoryStore> {
    StockEngine::new(MemoryStore::new(rows(), GroupingMode::ItemAndPo))
}

#[test]
fn test_total_qty_is_sum_of_locations() {
    let engine = engine();
    let page = engine.fetch_page("", 1, 100).unwrap();
    assert_eq!(page.items.len(), 23);
    for item in &page.items {
        let sum: f64 = item.locations.iter().map(|l| l.qty).sum();
        assert_eq!(item.total_qty, sum, "{}", item.group.item_code);
    }
    let f001 = page.items.iter().find(|i| i.group.item_code == "F001").unwrap();
    assert_eq!(f001.total_qty, 1.5);
}

#[test]
fn test_page_sweep_is_complete() {
    let engine = engine();
    for page_size in [1, 4, 7, 8, 23, 50] {
        let total = engine.fetch_page("", 1, page_size).unwrap().total_count;
        let mut seen = HashSet::new();
        let mut fetched = 0u64;
        for page in 1..=page_count(total, page_size) {
            let result = engine.fetch_page("", page, page_size).unwrap();
            assert!(result.items.len() <= page_size as usize);
            assert_eq!(result.total_count, total);
            for item in result.items {
                fetched += 1;
                assert!(seen.insert(item.group.key()), "duplicate {:?}", item.group.key());
            }
        }
        assert_eq!(fetched, total, "page size {page_size}");
    }
}

#[test]
fn test_page_past_end() {
    let engine = engine();
    let total = engine.fetch_page("", 1, 8).unwrap().total_count;
    let past = engine.fetch_page("", page_count(total, 8) + 5, 8).unwrap();
    assert!(past.items.is_empty());
    assert_eq!(past.total_count, total);
}

#[test]
fn test_search_filter() {
    let engine = engine();
    let result = engine.fetch_page("ABC", 1, 100).unwrap();
    assert_eq!(result.total_count, 5);
    for item in &result.items {
        let code = item.group.item_code.to_lowercase();
        let supplier = item.group.supplier_name.clone().unwrap_or_default().to_lowercase();
        assert!(code.contains("abc") || supplier.contains("abc"), "{code}");
    }
    assert!(result.items.iter().any(|i| i.group.item_code == "XABC1"));

    let lower = engine.fetch_page("abc", 1, 100).unwrap();
    assert_eq!(lower.total_count, result.total_count);

    let unfiltered = engine.fetch_page("", 1, 100).unwrap();
    assert_eq!(unfiltered.total_count, 23);

    let none = engine.fetch_page("no such thing", 1, 8).unwrap();
    assert!(none.items.is_empty());
    assert_eq!(none.total_count, 0);
}

#[test]
fn test_f100_example() {
    let rows = vec![
        StockRow::new("F100").bar_code("B2").qty(2.5),
        StockRow::new("F100").bar_code("B1").qty(5.0),
    ];
    let engine = StockEngine::new(MemoryStore::new(rows, GroupingMode::Item));
    let page = engine.fetch_page("", 1, 8).unwrap();
    let item = &page.items[0];
    assert_eq!(item.group.key(), GroupKey::new("F100", None));
    assert_eq!(item.total_qty, 7.5);
    let bars: Vec<_> = item.locations.iter().map(|l| l.bar_code.as_deref()).collect();
    assert_eq!(bars, vec![Some("B1"), Some("B2")]);
}

#[test]
fn test_stable_order() {
    let engine = engine();
    let a = engine.fetch_page("", 2, 7).unwrap();
    let b = engine.fetch_page("", 2, 7).unwrap();
    assert_eq!(a, b);
}
