//! Response envelopes.

use crate::error::StockError;
use crate::model::{AggregatedItem, PageResult};
use serde::Serialize;

pub(crate) const JSON: &str = "Content-Type: application/json";
pub(crate) const PROMETHEUS_TEXT: &str = "Content-Type: text/plain; version=0.0.4; charset=utf-8";

/// Generic failure message; connection details are never sent to clients.
pub const FETCH_FAILED: &str = "Data fetching failed";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageEnvelope<'a> {
    success: bool,
    data: &'a [AggregatedItem],
    total_count: u64,
    page: u32,
    page_size: u32,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct HealthEnvelope {
    status: &'static str,
}

/// A fully rendered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, reason: &'static str, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                reason,
                content_type: JSON,
                body,
            },
            Err(err) => {
                log::error!("failed to encode response: {err}");
                Self {
                    status: 500,
                    reason: "Internal Server Error",
                    content_type: JSON,
                    body: br#"{"success":false,"error":"Internal Server Error"}"#.to_vec(),
                }
            }
        }
    }

    pub fn page(result: &PageResult) -> Self {
        Self::json(
            200,
            "OK",
            &PageEnvelope {
                success: true,
                data: &result.items,
                total_count: result.total_count,
                page: result.page,
                page_size: result.page_size,
            },
        )
    }

    /// 500 envelope. Connection failures carry no details.
    pub fn failure(err: &StockError) -> Self {
        let details = (!err.is_connection()).then(|| err.detail());
        Self::json(
            500,
            "Internal Server Error",
            &ErrorEnvelope {
                success: false,
                error: FETCH_FAILED,
                details,
            },
        )
    }

    pub fn not_found() -> Self {
        Self::json(
            404,
            "Not Found",
            &ErrorEnvelope {
                success: false,
                error: "Not Found",
                details: None,
            },
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::json(
            405,
            "Method Not Allowed",
            &ErrorEnvelope {
                success: false,
                error: "Method Not Allowed",
                details: None,
            },
        )
    }

    pub fn preflight() -> Self {
        Self {
            status: 204,
            reason: "No Content",
            content_type: JSON,
            body: Vec::new(),
        }
    }

    pub fn health(healthy: bool) -> Self {
        if healthy {
            Self::json(200, "OK", &HealthEnvelope { status: "ok" })
        } else {
            Self::json(503, "Service Unavailable", &HealthEnvelope { status: "unavailable" })
        }
    }

    pub fn text(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type,
            body: body.into_bytes(),
        }
    }

    /// Body decoded as JSON, for tests and diagnostics.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_envelope_shape() {
        let response = ApiResponse::page(&PageResult::empty(0, 4, 8));
        assert_eq!(response.status, 200);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"success": true, "data": [], "totalCount": 0, "page": 4, "pageSize": 8})
        );
    }

    #[test]
    fn test_query_failure_has_details() {
        let response = ApiResponse::failure(&StockError::Query("relation does not exist".into()));
        assert_eq!(response.status, 500);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"success": false, "error": FETCH_FAILED, "details": "relation does not exist"})
        );
    }

    #[test]
    fn test_connection_failure_hides_details() {
        let response = ApiResponse::failure(&StockError::Connection("password authentication failed".into()));
        let body = response.json_body().unwrap();
        assert_eq!(body, json!({"success": false, "error": FETCH_FAILED}));
    }

    #[test]
    fn test_health() {
        assert_eq!(ApiResponse::health(true).status, 200);
        let down = ApiResponse::health(false);
        assert_eq!(down.status, 503);
        assert_eq!(down.json_body().unwrap(), json!({"status": "unavailable"}));
    }
}
