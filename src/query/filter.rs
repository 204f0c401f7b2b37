//! Search filter shared by the group and count phases.

use crate::query::column::StockColumn;
use sea_query::{Condition, Expr, ExprTrait, Func, LikeExpr};

const LIKE_ESCAPE: char = '\\';

/// Case-insensitive "contains" filter over item code and supplier name.
///
/// An empty (or all-whitespace) term means no filter at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilter {
    term: Option<String>,
}

impl SearchFilter {
    pub fn new(search: &str) -> Self {
        let trimmed = search.trim();
        Self {
            term: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_none()
    }

    /// In-memory evaluation of the same predicate as [`SearchFilter::condition`].
    pub fn matches(&self, item_code: &str, supplier_name: Option<&str>) -> bool {
        let Some(term) = &self.term else {
            return true;
        };
        let needle = term.to_lowercase();
        item_code.to_lowercase().contains(&needle)
            || supplier_name.is_some_and(|s| s.to_lowercase().contains(&needle))
    }

    /// `LOWER(ITEM_CODE) LIKE $n OR LOWER(MATERIAL_SUPPLIER_NAME) LIKE $n`.
    ///
    /// The term is lower-cased, LIKE wildcards inside it are escaped and the
    /// resulting pattern is bound as a value, never spliced into the SQL.
    pub fn condition(&self) -> Option<Condition> {
        let term = self.term.as_ref()?;
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let contains = |col: StockColumn| {
            Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
        };
        Some(
            Condition::any()
                .add(contains(StockColumn::ItemCode))
                .add(contains(StockColumn::SupplierName)),
        )
    }
}

/// Escape `%`, `_` and the escape character itself so they match literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
