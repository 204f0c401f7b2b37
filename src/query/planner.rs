//! SQL for the three query shapes of a page fetch.
//!
//! * group phase: one row per grouping key matching the search, ordered and
//!   bounded by the page window;
//! * location phase: every location row whose key belongs to the keys returned
//!   by the group phase (no paging, the key set is already bounded);
//! * count phase: number of grouping keys under the same search predicate.
//!
//! Every user-supplied value is bound as a parameter; the rendered SQL only
//! ever contains `$n` placeholders in their place.

use crate::model::{GroupKey, GroupingMode};
use crate::pagination;
use crate::query::column::{key_columns, StockColumn, ATTRIBUTE_COLUMNS, LOCATION_COLUMNS};
use crate::query::filter::SearchFilter;
use sea_query::{
    Condition, DynIden, Expr, ExprTrait, Func, NullOrdering, Order, PostgresQueryBuilder, Query,
    SelectStatement, Values,
};

/// Rendered SQL plus its bound values.
#[derive(Debug, Clone)]
pub struct StockStatement {
    pub sql: String,
    pub values: Values,
}

impl StockStatement {
    fn build(stmt: &SelectStatement) -> Self {
        let (sql, values) = stmt.build(PostgresQueryBuilder);
        Self { sql, values }
    }
}

/// Builds the statements for one table and grouping mode.
#[derive(Debug, Clone)]
pub struct StockQueryPlanner {
    table: String,
    mode: GroupingMode,
}

impl StockQueryPlanner {
    pub fn new(table: impl Into<String>, mode: GroupingMode) -> Self {
        Self {
            table: table.into(),
            mode,
        }
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    fn table(&self) -> DynIden {
        DynIden::from(self.table.clone())
    }

    /// Group phase: keys plus `MAX` of each descriptive attribute, one row per key.
    pub fn group_page(&self, filter: &SearchFilter, page: u32, page_size: u32) -> StockStatement {
        let mut stmt = self.grouped(filter);
        for attr in ATTRIBUTE_COLUMNS {
            stmt.expr_as(Func::max(Expr::col(attr)), attr);
        }
        for key in key_columns(self.mode) {
            stmt.order_by_with_nulls(*key, Order::Asc, NullOrdering::Last);
        }
        stmt.limit(u64::from(page_size))
            .offset(pagination::offset(page, page_size));
        StockStatement::build(&stmt)
    }

    /// Location phase for the given keys.
    ///
    /// Callers must not pass an empty key set; the engine skips this phase then.
    pub fn locations(&self, keys: &[GroupKey]) -> StockStatement {
        let mut stmt = Query::select();
        stmt.columns(key_columns(self.mode).iter().copied())
            .columns(LOCATION_COLUMNS)
            .from(self.table())
            .cond_where(self.key_membership(keys))
            .order_by_with_nulls(StockColumn::ItemCode, Order::Asc, NullOrdering::Last)
            .order_by_with_nulls(StockColumn::PoNumber, Order::Asc, NullOrdering::Last)
            .order_by_with_nulls(StockColumn::BarCode, Order::Asc, NullOrdering::Last);
        StockStatement::build(&stmt)
    }

    /// Count phase: `SELECT COUNT(*) FROM (<grouped keys>) AS stock_groups`.
    pub fn count(&self, filter: &SearchFilter) -> StockStatement {
        let inner = self.grouped(filter);
        let mut stmt = Query::select();
        stmt.expr_as(Expr::cust("COUNT(*)"), DynIden::from("total".to_string()))
            .from_subquery(inner, DynIden::from("stock_groups".to_string()));
        StockStatement::build(&stmt)
    }

    /// `SELECT <keys> FROM <table> WHERE <item code present> [AND <search>]
    /// GROUP BY <keys>`, shared by the group and count phases so both see the
    /// identical predicate. Rows without an item code never form a card.
    fn grouped(&self, filter: &SearchFilter) -> SelectStatement {
        let keys = key_columns(self.mode);
        let mut stmt = Query::select();
        stmt.columns(keys.iter().copied())
            .from(self.table())
            .and_where(Expr::col(StockColumn::ItemCode).is_not_null())
            .and_where(Expr::col(StockColumn::ItemCode).ne(""));
        if let Some(condition) = filter.condition() {
            stmt.cond_where(condition);
        }
        stmt.group_by_columns(keys.iter().copied());
        stmt
    }

    fn key_membership(&self, keys: &[GroupKey]) -> Condition {
        match self.mode {
            GroupingMode::Item => Condition::all().add(
                Expr::col(StockColumn::ItemCode).is_in(keys.iter().map(|k| k.item_code.clone())),
            ),
            GroupingMode::ItemAndPo => keys.iter().fold(Condition::any(), |any, key| {
                let po = match &key.po_number {
                    Some(po) => Expr::col(StockColumn::PoNumber).eq(po.clone()),
                    None => Expr::col(StockColumn::PoNumber).is_null(),
                };
                any.add(
                    Condition::all()
                        .add(Expr::col(StockColumn::ItemCode).eq(key.item_code.clone()))
                        .add(po),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "VIEW_MATERIAL_STOCK_COMBINED";

    fn planner(mode: GroupingMode) -> StockQueryPlanner {
        StockQueryPlanner::new(TABLE, mode)
    }

    #[test]
    fn test_group_page_shape() {
        let stmt = planner(GroupingMode::ItemAndPo).group_page(&SearchFilter::none(), 3, 8);
        let sql = stmt.sql;
        assert!(sql.contains(r#"FROM "VIEW_MATERIAL_STOCK_COMBINED""#), "{sql}");
        assert!(sql.contains(r#"GROUP BY "ITEM_CODE", "FAB_PO_NO""#), "{sql}");
        assert!(sql.contains(r#"MAX("BUYER_NAME")"#), "{sql}");
        assert!(sql.contains("ORDER BY"), "{sql}");
        assert!(sql.contains("LIMIT"), "{sql}");
        assert!(sql.contains("OFFSET"), "{sql}");
        assert!(sql.contains(r#""ITEM_CODE" IS NOT NULL"#), "{sql}");
        assert!(!sql.contains("LIKE"), "{sql}");
    }

    #[test]
    fn test_group_page_binds_window() {
        let stmt = planner(GroupingMode::Item).group_page(&SearchFilter::none(), 3, 8);
        let bound: Vec<String> = stmt.values.iter().map(|v| format!("{v:?}")).collect();
        // empty item code guard, then LIMIT and OFFSET
        assert_eq!(bound.len(), 3, "{bound:?}");
        assert!(bound[1].contains('8'), "{bound:?}");
        assert!(bound[2].contains("16"), "{bound:?}");
    }

    #[test]
    fn test_search_term_is_never_inlined() {
        let hostile = "x'); DROP TABLE stock; --";
        let filter = SearchFilter::new(hostile);
        let p = planner(GroupingMode::ItemAndPo);

        for stmt in [p.group_page(&filter, 1, 8), p.count(&filter)] {
            assert!(!stmt.sql.contains("DROP TABLE"), "{}", stmt.sql);
            assert!(stmt.sql.contains("LIKE $"), "{}", stmt.sql);
            assert!(stmt.sql.contains("LOWER"), "{}", stmt.sql);
            assert!(stmt.sql.contains(r#""MATERIAL_SUPPLIER_NAME""#), "{}", stmt.sql);
        }
    }

    #[test]
    fn test_count_uses_same_predicate_as_group_page() {
        let filter = SearchFilter::new("abc");
        let p = planner(GroupingMode::ItemAndPo);
        let page = p.group_page(&filter, 1, 8);
        let count = p.count(&filter);

        let where_of = |sql: &str| {
            let start = sql.find("WHERE").expect("WHERE clause");
            let end = sql.find("GROUP BY").expect("GROUP BY clause");
            sql[start..end].to_string()
        };
        assert_eq!(where_of(&page.sql), where_of(&count.sql));
        assert!(count.sql.starts_with("SELECT COUNT(*)"), "{}", count.sql);
        assert!(!count.sql.contains("LIMIT"), "{}", count.sql);
        assert!(!count.sql.contains("OFFSET"), "{}", count.sql);
    }

    #[test]
    fn test_locations_item_mode_uses_in_list() {
        let keys = vec![GroupKey::new("F100", None), GroupKey::new("F200", None)];
        let stmt = planner(GroupingMode::Item).locations(&keys);
        assert!(stmt.sql.contains(r#""ITEM_CODE" IN ($1, $2)"#), "{}", stmt.sql);
        assert!(!stmt.sql.contains("LIMIT"), "{}", stmt.sql);
        assert!(!stmt.sql.contains("OFFSET"), "{}", stmt.sql);
        assert!(!stmt.sql.contains("F100"), "{}", stmt.sql);
    }

    #[test]
    fn test_locations_item_and_po_mode() {
        let keys = vec![
            GroupKey::new("F100", Some("PO-1".into())),
            GroupKey::new("F200", None),
        ];
        let stmt = planner(GroupingMode::ItemAndPo).locations(&keys);
        assert!(stmt.sql.contains(r#""FAB_PO_NO" IS NULL"#), "{}", stmt.sql);
        assert!(stmt.sql.contains(" OR "), "{}", stmt.sql);
        assert_eq!(stmt.values.iter().count(), 3);
        assert!(stmt.sql.contains(r#"ORDER BY "ITEM_CODE" ASC NULLS LAST, "FAB_PO_NO" ASC NULLS LAST, "BAR_CODE" ASC NULLS LAST"#), "{}", stmt.sql);
    }
}
