//! Prometheus metrics and tracing spans.
//!
//! Metrics live in a dedicated registry behind [`METRICS`] and are rendered
//! by the `/metrics` route. Spans are only built with the `tracing` feature.

#[cfg(feature = "metrics")]
pub use prometheus_metrics::{StockMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use prometheus::{
        Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
        TextEncoder,
    };
    use std::time::Duration;

    pub static METRICS: Lazy<StockMetrics> = Lazy::new(StockMetrics::init);

    const LATENCY_BUCKETS: [f64; 10] = [0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0];

    pub struct StockMetrics {
        registry: Registry,
        pub requests_total: IntCounterVec,
        pub phase_duration: HistogramVec,
        pub query_duration: Histogram,
        pub query_errors_total: IntCounter,
        pub pool_wait_duration: Histogram,
    }

    impl StockMetrics {
        pub fn init() -> Self {
            let registry = Registry::new_custom(Some("stockview".to_string()), None)
                .expect("failed to build prometheus registry");

            let requests_total = IntCounterVec::new(
                Opts::new("requests_total", "HTTP requests by route and outcome"),
                &["route", "outcome"],
            )
            .expect("valid requests_total");
            let phase_duration = HistogramVec::new(
                HistogramOpts::new("fetch_phase_duration_seconds", "Duration of each page fetch phase")
                    .buckets(LATENCY_BUCKETS.to_vec()),
                &["phase"],
            )
            .expect("valid fetch_phase_duration_seconds");
            let query_duration = Histogram::with_opts(
                HistogramOpts::new("query_duration_seconds", "Duration of queries")
                    .buckets(LATENCY_BUCKETS.to_vec()),
            )
            .expect("valid query_duration_seconds");
            let query_errors_total =
                IntCounter::new("query_errors_total", "Queries that failed").expect("valid query_errors_total");
            let pool_wait_duration = Histogram::with_opts(
                HistogramOpts::new("pool_wait_seconds", "Time spent waiting for a pooled connection")
                    .buckets(LATENCY_BUCKETS.to_vec()),
            )
            .expect("valid pool_wait_seconds");

            for collector in [
                Box::new(requests_total.clone()) as Box<dyn prometheus::core::Collector>,
                Box::new(phase_duration.clone()),
                Box::new(query_duration.clone()),
                Box::new(query_errors_total.clone()),
                Box::new(pool_wait_duration.clone()),
            ] {
                registry.register(collector).expect("metric registered once");
            }

            Self {
                registry,
                requests_total,
                phase_duration,
                query_duration,
                query_errors_total,
                pool_wait_duration,
            }
        }

        pub fn record_request(&self, route: &str, outcome: &str) {
            self.requests_total.with_label_values(&[route, outcome]).inc();
        }

        pub fn record_phase(&self, phase: &str, elapsed: Duration) {
            self.phase_duration
                .with_label_values(&[phase])
                .observe(elapsed.as_secs_f64());
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.query_duration.observe(elapsed.as_secs_f64());
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.inc();
        }

        pub fn observe_pool_wait(&self, waited: Duration) {
            self.pool_wait_duration.observe(waited.as_secs_f64());
        }

        /// Text exposition of every registered metric.
        pub fn render(&self) -> Result<String, prometheus::Error> {
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
            String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn fetch_page_span(search: &str, page: u32, page_size: u32) -> Span {
        tracing::info_span!("stockview.fetch_page", search = search, page = page, page_size = page_size)
    }

    pub fn fetch_phase_span(phase: &'static str) -> Span {
        tracing::debug_span!("stockview.fetch_phase", phase = phase)
    }

    pub fn execute_query_span(query: &str) -> Span {
        tracing::debug_span!("stockview.execute_query", db.statement = query)
    }

    pub fn acquire_connection_span() -> Span {
        tracing::debug_span!("stockview.acquire_connection")
    }
}
