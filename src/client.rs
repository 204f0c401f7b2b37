//! Page sources for the display board.
//!
//! The board only needs "give me page N of search S". [`HttpPageSource`] asks
//! a running service over HTTP; [`EnginePageSource`] calls a [`StockEngine`]
//! in process (single-binary demos and tests).

use crate::engine::StockEngine;
use crate::error::StockError;
use crate::http::response::FETCH_FAILED;
use crate::model::{AggregatedItem, PageResult};
use crate::store::StockStore;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What the board asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub search: String,
    pub page: u32,
    pub page_size: u32,
}

/// Failure shown inline on the board.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFetchError {
    /// The service could not be reached
    Network(String),
    /// Non-success status without a readable error envelope
    Status(u16),
    /// Response body was not the expected JSON
    Decode(String),
    /// The service answered with `success: false`
    Server { error: String, details: Option<String> },
}

impl fmt::Display for ClientFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFetchError::Network(e) => write!(f, "Network error: {e}"),
            ClientFetchError::Status(code) => write!(f, "Unexpected status {code}"),
            ClientFetchError::Decode(e) => write!(f, "Invalid response: {e}"),
            ClientFetchError::Server { error, details: Some(details) } => write!(f, "{error}: {details}"),
            ClientFetchError::Server { error, details: None } => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ClientFetchError {}

impl From<StockError> for ClientFetchError {
    fn from(err: StockError) -> Self {
        ClientFetchError::Server {
            error: FETCH_FAILED.to_string(),
            details: (!err.is_connection()).then(|| err.detail().to_string()),
        }
    }
}

/// Something that serves pages to the board.
pub trait PageSource: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ClientFetchError>;
}

/// Wire envelope of `/api/getData`, success or failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Vec<AggregatedItem>,
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl Envelope {
    fn into_page(self, request: &FetchRequest) -> Result<PageResult, ClientFetchError> {
        if !self.success {
            return Err(ClientFetchError::Server {
                error: self.error.unwrap_or_else(|| FETCH_FAILED.to_string()),
                details: self.details,
            });
        }
        Ok(PageResult {
            items: self.data,
            total_count: self.total_count,
            page: self.page.unwrap_or(request.page),
            page_size: self.page_size.unwrap_or(request.page_size),
        })
    }
}

/// Decode a response body; `status` decides how a non-envelope body is reported.
fn decode(status: u16, body: &str, request: &FetchRequest) -> Result<PageResult, ClientFetchError> {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.into_page(request),
        Err(_) if status >= 400 => Err(ClientFetchError::Status(status)),
        Err(err) => Err(ClientFetchError::Decode(err.to_string())),
    }
}

/// Blocking HTTP client for a running stock service.
pub struct HttpPageSource {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpPageSource {
    /// `base_url` is the service root, e.g. `http://localhost:4000`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint: format!("{}/api/getData", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ClientFetchError> {
        let page = request.page.to_string();
        let page_size = request.page_size.to_string();
        let call = self
            .agent
            .get(&self.endpoint)
            .query("search", &request.search)
            .query("page", &page)
            .query("pageSize", &page_size)
            .call();

        let (status, response) = match call {
            Ok(response) => (response.status(), response),
            Err(ureq::Error::Status(code, response)) => (code, response),
            Err(ureq::Error::Transport(transport)) => {
                return Err(ClientFetchError::Network(transport.to_string()));
            }
        };
        let body = response
            .into_string()
            .map_err(|e| ClientFetchError::Network(e.to_string()))?;
        decode(status, &body, request)
    }
}

/// In-process source calling the engine directly.
pub struct EnginePageSource<S> {
    engine: Arc<StockEngine<S>>,
    max_page_size: u32,
}

impl<S: StockStore> EnginePageSource<S> {
    pub fn new(engine: Arc<StockEngine<S>>, max_page_size: u32) -> Self {
        Self { engine, max_page_size }
    }
}

impl<S: StockStore> PageSource for EnginePageSource<S> {
    fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ClientFetchError> {
        let page_size = crate::pagination::clamp_page_size(request.page_size, self.max_page_size);
        Ok(self
            .engine
            .fetch_page(&request.search, request.page.max(1), page_size)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupingMode, StockRow};
    use crate::store::MemoryStore;

    fn request() -> FetchRequest {
        FetchRequest {
            search: String::new(),
            page: 2,
            page_size: 8,
        }
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"success":true,"data":[{"itemCode":"F100","poNumber":null,"buyerName":"Acme",
            "uom":"M","supplierName":"Abc","inspectionStatus":null,
            "locations":[{"barCode":"B1","rackNo":"R1","shelfNo":"S1","stockLocation":"WH",
            "qty":5.0,"receivedDate":"2024-03-01T08:30:00","invoiceNo":"INV-1","fullLocation":"WH-R1-S1"}],
            "totalQty":5.0}],"totalCount":9,"page":2,"pageSize":8}"#;
        let page = decode(200, body, &request()).unwrap();
        assert_eq!(page.total_count, 9);
        assert_eq!(page.items[0].group.item_code, "F100");
        assert_eq!(page.items[0].locations[0].full_location, "WH-R1-S1");
        assert!(page.items[0].first_received().is_some());
    }

    #[test]
    fn test_decode_failure_envelope() {
        let body = r#"{"success":false,"error":"Data fetching failed","details":"timeout"}"#;
        assert_eq!(
            decode(500, body, &request()).unwrap_err(),
            ClientFetchError::Server {
                error: "Data fetching failed".into(),
                details: Some("timeout".into())
            }
        );
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(decode(502, "<html>", &request()).unwrap_err(), ClientFetchError::Status(502));
        assert!(matches!(decode(200, "<html>", &request()), Err(ClientFetchError::Decode(_))));
    }

    #[test]
    fn test_engine_source_clamps_request() {
        let rows = (0..30).map(|i| StockRow::new(format!("F{i:03}")).qty(1.0)).collect();
        let engine = Arc::new(StockEngine::new(MemoryStore::new(rows, GroupingMode::Item)));
        let source = EnginePageSource::new(engine, 10);
        let page = source
            .fetch(&FetchRequest {
                search: String::new(),
                page: 0,
                page_size: 50,
            })
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_count, 30);
    }

    #[test]
    fn test_unreachable_service_is_network_error() {
        let source = HttpPageSource::new("http://127.0.0.1:9", Duration::from_millis(200));
        assert!(matches!(source.fetch(&request()), Err(ClientFetchError::Network(_))));
    }
}
