//! Ingestion metrics for the events domain.

use metrics::counter;

/// Event ingestion metrics recorder
pub struct EventMetrics;

impl EventMetrics {
    /// Record an event that passed validation and was stored.
    ///
    /// Event names come from the request path, so they are never used as
    /// labels.
    pub fn record_ingested() {
        counter!("events_ingested_total").increment(1);
    }

    /// Record an event rejected before storage.
    ///
    /// `reason` is a short fixed label such as `bad_visitor` or `bad_payload`.
    pub fn record_rejected(reason: &'static str) {
        counter!("events_rejected_total", "reason" => reason).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn series<'a>(rendered: &'a str, name: &str) -> Vec<&'a str> {
        rendered
            .lines()
            .filter(|line| line.starts_with(name))
            .collect()
    }

    #[test]
    fn test_ingested_is_a_single_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            for _ in 0..500 {
                EventMetrics::record_ingested();
            }
        });

        let rendered = handle.render();
        assert_eq!(
            series(&rendered, "events_ingested_total"),
            vec!["events_ingested_total 500"]
        );
    }

    #[test]
    fn test_rejected_by_reason() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            EventMetrics::record_rejected("bad_visitor");
            EventMetrics::record_rejected("bad_visitor");
            EventMetrics::record_rejected("bad_payload");
        });

        let rendered = handle.render();
        let rejected = series(&rendered, "events_rejected_total");
        assert_eq!(rejected.len(), 2);
        assert!(rejected.contains(&"events_rejected_total{reason=\"bad_visitor\"} 2"));
    }
}
