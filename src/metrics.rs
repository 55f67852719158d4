use std::sync::OnceLock;

use axum::{routing::get, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process.
    ///
    /// A second router in the same process (tests) reuses the first handle. If some
    /// other recorder is already installed, a detached handle is returned.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => h,
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            })
            .clone();
        Self { handle }
    }

    /// `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_score(strategy: &'static str, eigenvalue: f64) {
    counter!("reading_scores_total", "strategy" => strategy).increment(1);
    histogram!("reading_eigenvalue").record(eigenvalue);
}

pub fn record_reading_created(strategy: &'static str) {
    counter!("readings_created_total", "strategy" => strategy).increment(1);
}
