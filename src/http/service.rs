//! `may_minihttp` service.
//!
//! Routing and rendering live in [`StockService::handle`], which takes the
//! request method and target and returns an [`ApiResponse`]; the
//! `HttpService` impl only copies that onto the wire.

use crate::config::StockConfig;
use crate::engine::StockEngine;
use crate::http::params::PageQuery;
use crate::http::response::ApiResponse;
use crate::store::StockStore;
use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService, Request, Response};
use std::io;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

pub const DATA_ROUTE: &str = "/api/getData";
pub const HEALTH_ROUTE: &str = "/health";
pub const METRICS_ROUTE: &str = "/metrics";
/// Route label for every path outside the known routes.
pub const UNMATCHED_ROUTE: &str = "unmatched";

pub struct StockService<S> {
    engine: Arc<StockEngine<S>>,
    default_page_size: u32,
    max_page_size: u32,
}

impl<S> Clone for StockService<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

impl<S: StockStore> StockService<S> {
    pub fn new(engine: Arc<StockEngine<S>>, stock: &StockConfig) -> Self {
        Self {
            engine,
            default_page_size: stock.default_page_size,
            max_page_size: stock.max_page_size,
        }
    }

    /// Route one request. Never fails; errors become JSON envelopes.
    pub fn handle(&self, method: &str, target: &str) -> ApiResponse {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        let route = match path {
            DATA_ROUTE => DATA_ROUTE,
            HEALTH_ROUTE => HEALTH_ROUTE,
            METRICS_ROUTE if cfg!(feature = "metrics") => METRICS_ROUTE,
            _ => {
                log::debug!("{method} {path}: not found");
                record(UNMATCHED_ROUTE, "not_found");
                return ApiResponse::not_found();
            }
        };
        if method.eq_ignore_ascii_case("OPTIONS") {
            return ApiResponse::preflight();
        }
        if !method.eq_ignore_ascii_case("GET") {
            record(route, "method_not_allowed");
            return ApiResponse::method_not_allowed();
        }

        match route {
            DATA_ROUTE => self.get_data(query),
            HEALTH_ROUTE => self.health(),
            _ => metrics_response(),
        }
    }

    fn get_data(&self, query: &str) -> ApiResponse {
        let request = PageQuery::parse(query, self.default_page_size, self.max_page_size);
        log::debug!(
            "getting data: search={:?} page={} pageSize={}",
            request.search,
            request.page,
            request.page_size
        );
        match self.engine.fetch_page(&request.search, request.page, request.page_size) {
            Ok(result) => {
                record(DATA_ROUTE, "ok");
                ApiResponse::page(&result)
            }
            Err(err) => {
                log::error!("database query failed: {err}");
                record(DATA_ROUTE, "error");
                ApiResponse::failure(&err)
            }
        }
    }

    fn health(&self) -> ApiResponse {
        let healthy = match self.engine.check_health() {
            Ok(healthy) => healthy,
            Err(err) => {
                log::warn!("health check failed: {err}");
                false
            }
        };
        record(HEALTH_ROUTE, if healthy { "ok" } else { "error" });
        ApiResponse::health(healthy)
    }
}

#[cfg(feature = "metrics")]
fn metrics_response() -> ApiResponse {
    match METRICS.render() {
        Ok(text) => ApiResponse::text(crate::http::response::PROMETHEUS_TEXT, text),
        Err(err) => {
            log::error!("failed to render metrics: {err}");
            ApiResponse::failure(&crate::error::StockError::Query(err.to_string()))
        }
    }
}

#[cfg(not(feature = "metrics"))]
fn metrics_response() -> ApiResponse {
    ApiResponse::not_found()
}

fn record(route: &str, outcome: &str) {
    #[cfg(feature = "metrics")]
    METRICS.record_request(route, outcome);
    #[cfg(not(feature = "metrics"))]
    let _ = (route, outcome);
}

impl<S: StockStore + 'static> HttpService for StockService<S> {
    fn call(&mut self, req: Request, rsp: &mut Response) -> io::Result<()> {
        let reply = self.handle(req.method(), req.path());
        rsp.status_code(usize::from(reply.status), reply.reason);
        rsp.header(reply.content_type);
        rsp.header("Access-Control-Allow-Origin: *");
        if reply.status == 204 {
            rsp.header("Access-Control-Allow-Methods: GET, OPTIONS");
            rsp.header("Access-Control-Allow-Headers: Content-Type");
        }
        rsp.body_vec(reply.body);
        Ok(())
    }
}

/// Start serving on `addr` (e.g. `0.0.0.0:4000`).
pub fn serve<S: StockStore + 'static>(addr: &str, service: StockService<S>) -> io::Result<JoinHandle<()>> {
    let handle = HttpServer(service).start(addr)?;
    log::info!("Server is running on {addr}");
    Ok(handle)
}
