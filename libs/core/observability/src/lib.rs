//! Observability utilities for the event ingestion service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Request metrics recorded by the HTTP dispatcher
//! - Ingestion metrics recorded by the events domain
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, EventMetrics};
//!
//! init_metrics()?;
//!
//! EventMetrics::record_ingested();
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod events;
pub mod http;

pub use events::EventMetrics;
pub use http::HttpMetrics;

use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Initialize the Prometheus metrics recorder.
///
/// Safe to call more than once; only the first call installs the recorder.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the current metrics in the Prometheus text format.
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], render_metrics())
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Ingestion metrics
    describe_counter!(
        "events_ingested_total",
        "Events accepted and stored"
    );
    describe_counter!(
        "events_rejected_total",
        "Events rejected before storage, by reason"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_render_without_recorder() {
        if get_metrics_handle().is_none() {
            assert_eq!(render_metrics(), "# Metrics not initialized\n");
        }
    }

    #[tokio::test]
    async fn test_metrics_handler_content_type() {
        let response = metrics_handler().await.into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            EXPOSITION_CONTENT_TYPE
        );
    }
}
