//! Error type shared by the store, pool and engine layers.

use std::fmt;

/// Failure while producing a page of stock.
///
/// `Connection` means the row store could not be reached (or no pooled
/// connection became available in time). `Query` and `Parse` are failures of
/// a single request and never affect other requests.
#[derive(Debug, Clone, PartialEq)]
pub enum StockError {
    /// Row store unreachable or pool exhausted
    Connection(String),
    /// Query execution error (malformed query, timeout, constraint)
    Query(String),
    /// Row decoding error
    Parse(String),
}

impl StockError {
    /// True when the failure is about reaching the store rather than a single query.
    pub fn is_connection(&self) -> bool {
        matches!(self, StockError::Connection(_))
    }

    /// Human readable detail without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            StockError::Connection(s) | StockError::Query(s) | StockError::Parse(s) => s,
        }
    }
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockError::Connection(s) => write!(f, "Connection error: {s}"),
            StockError::Query(s) => write!(f, "Query error: {s}"),
            StockError::Parse(s) => write!(f, "Parse error: {s}"),
        }
    }
}

impl std::error::Error for StockError {}

impl From<may_postgres::Error> for StockError {
    fn from(err: may_postgres::Error) -> Self {
        // A closed client cannot serve any further query, everything else is per-query.
        if err.is_closed() {
            StockError::Connection(err.to_string())
        } else {
            StockError::Query(err.to_string())
        }
    }
}

impl From<crate::connection::ConnectionError> for StockError {
    fn from(err: crate::connection::ConnectionError) -> Self {
        StockError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_display() {
        let err = StockError::Query("bad column".to_string());
        assert_eq!(err.to_string(), "Query error: bad column");

        let err = StockError::Connection("refused".to_string());
        assert!(err.to_string().contains("Connection error"));
        assert!(err.is_connection());
    }

    #[test]
    fn test_detail_strips_category() {
        let err = StockError::Parse("MLS_QTY".to_string());
        assert_eq!(err.detail(), "MLS_QTY");
        assert!(!err.is_connection());
    }
}
