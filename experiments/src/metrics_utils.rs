use std::time::Instant;

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::IntoResponse,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::metrics_consts::{HTTP_REQUESTS_COUNTER, HTTP_REQUESTS_DURATION};

/// Installs the global Prometheus recorder. Panics when one is already installed,
/// so only call it once per process.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    const BUCKETS: &[f64] = &[
        0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(BUCKETS)
        .expect("non-empty bucket list")
        .install_recorder()
        .expect("no other metrics recorder installed")
}

/// Middleware to record some common HTTP metrics
pub async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };

    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!(HTTP_REQUESTS_COUNTER, &labels).increment(1);
    metrics::histogram!(HTTP_REQUESTS_DURATION, &labels).record(latency);

    response
}
