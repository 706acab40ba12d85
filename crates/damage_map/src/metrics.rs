use axum::{response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, Gauge, IntCounterVec, IntGauge, Registry, TextEncoder};

/// Prometheus collectors for the dashboard, shared behind an `Arc`.
pub struct DashboardMetrics {
    pub registry: Registry,
    /// Footprints currently loaded into the map layer.
    pub footprints_loaded: IntGauge,
    /// Wall time of the CSV -> WGS-84 load pipeline.
    pub load_seconds: Gauge,
    pub http_requests_total: IntCounterVec,
}

impl DashboardMetrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("damage_map".into()), None)
            .expect("Failed to create custom metrics registry");

        macro_rules! reg {
            ($metric:expr) => {{
                let collector = $metric;
                registry
                    .register(Box::new(collector.clone()))
                    .expect("Failed to register metric");
                collector
            }};
        }

        Self {
            footprints_loaded: reg!(IntGauge::new(
                "footprints_loaded",
                "Building footprints loaded into the map layer"
            )
            .expect("metric can be created")),
            load_seconds: reg!(Gauge::new(
                "load_seconds",
                "Time spent loading, parsing and reprojecting the input"
            )
            .expect("metric can be created")),
            http_requests_total: reg!(IntCounterVec::new(
                prometheus::Opts::new("http_requests_total", "Dashboard HTTP requests by route"),
                &["route"]
            )
            .expect("metric can be created")),
            registry,
        }
    }

    pub fn record_request(&self, route: &str) {
        self.http_requests_total.with_label_values(&[route]).inc();
    }

    pub fn router(&self) -> Router {
        let reg = self.registry.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let reg = reg.clone();
                async move {
                    let mut buf = Vec::new();
                    if let Err(e) = TextEncoder::new().encode(&reg.gather(), &mut buf) {
                        tracing::warn!(error = %e, "Failed to encode metrics");
                    }
                    String::from_utf8_lossy(&buf).into_owned().into_response()
                }
            }),
        )
    }
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collectors_are_namespaced() {
        let metrics = DashboardMetrics::new();
        metrics.footprints_loaded.set(4);
        metrics.load_seconds.set(0.25);
        metrics.record_request("index");
        metrics.record_request("index");

        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&metrics.registry.gather(), &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("damage_map_footprints_loaded 4"));
        assert!(text.contains("damage_map_load_seconds 0.25"));
        assert!(text.contains("damage_map_http_requests_total{route=\"index\"} 2"));
    }
}
