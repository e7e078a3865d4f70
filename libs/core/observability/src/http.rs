//! Request metrics recorded once per dispatched HTTP request.

use metrics::{counter, histogram};
use std::time::Duration;

/// HTTP request metrics recorder
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record one completed request.
    ///
    /// `route` is the matched route pattern (not the raw path) so label
    /// cardinality stays bounded.
    ///
    /// Records:
    /// - `http_requests_total` - Counter with method, path, status labels
    /// - `http_request_duration_seconds` - Histogram with method, path labels
    /// - `http_requests_errors_total` - Counter for 4xx and 5xx responses
    pub fn record_request(method: &str, route: &str, status: u16, elapsed: Duration) {
        let status_label = status.to_string();

        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => route.to_string(),
            "status" => status_label.clone(),
            "status_class" => status_class(status)
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "path" => route.to_string()
        )
        .record(elapsed.as_secs_f64());

        if status >= 400 {
            counter!(
                "http_requests_errors_total",
                "method" => method.to_string(),
                "path" => route.to_string(),
                "status" => status_label
            )
            .increment(1);
        }
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(200), "2xx");
        assert_eq!(status_class(304), "3xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(101), "other");
    }

    #[test]
    fn test_record_request_without_recorder_is_noop() {
        HttpMetrics::record_request("GET", "/api/events/:name", 200, Duration::from_millis(3));
        HttpMetrics::record_request("POST", "unmatched", 404, Duration::from_millis(1));
    }
}
