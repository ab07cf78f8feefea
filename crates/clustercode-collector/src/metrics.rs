use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Collector self-metrics, safe for concurrent access.
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    /// Poll cycles that reached decoding.
    pub cycles_total: AtomicU64,
    /// Cycles aborted because the body was not a valid progress document.
    pub cycles_rejected_total: AtomicU64,
    /// Polls that never produced a body.
    pub transport_errors_total: AtomicU64,
    /// Sample batches handed to the sink.
    pub commits_total: AtomicU64,
    /// Cycles that failed at the sink.
    pub sink_errors_total: AtomicU64,
    /// Charts materialized by the registry.
    pub charts_created_total: AtomicU64,
    /// Nodes registered with the scheduler (gauge).
    pub nodes_configured: AtomicU64,
}

impl CollectorMetrics {
    pub fn render(&self) -> String {
        format!(
            "# HELP clustercode_cycles_total Poll cycles that reached decoding.\n\
             # TYPE clustercode_cycles_total counter\n\
             clustercode_cycles_total {}\n\
             # HELP clustercode_cycles_rejected_total Cycles aborted on an invalid progress document.\n\
             # TYPE clustercode_cycles_rejected_total counter\n\
             clustercode_cycles_rejected_total {}\n\
             # HELP clustercode_transport_errors_total Polls that failed before a body was read.\n\
             # TYPE clustercode_transport_errors_total counter\n\
             clustercode_transport_errors_total {}\n\
             # HELP clustercode_commits_total Sample batches committed.\n\
             # TYPE clustercode_commits_total counter\n\
             clustercode_commits_total {}\n\
             # HELP clustercode_sink_errors_total Cycles that failed at the sink.\n\
             # TYPE clustercode_sink_errors_total counter\n\
             clustercode_sink_errors_total {}\n\
             # HELP clustercode_charts_created_total Charts created.\n\
             # TYPE clustercode_charts_created_total counter\n\
             clustercode_charts_created_total {}\n\
             # HELP clustercode_nodes_configured Nodes being polled.\n\
             # TYPE clustercode_nodes_configured gauge\n\
             clustercode_nodes_configured {}\n",
            self.cycles_total.load(Ordering::Relaxed),
            self.cycles_rejected_total.load(Ordering::Relaxed),
            self.transport_errors_total.load(Ordering::Relaxed),
            self.commits_total.load(Ordering::Relaxed),
            self.sink_errors_total.load(Ordering::Relaxed),
            self.charts_created_total.load(Ordering::Relaxed),
            self.nodes_configured.load(Ordering::Relaxed),
        )
    }
}

/// GET /metrics — Prometheus text exposition format.
pub async fn metrics_handler(State(metrics): State<Arc<CollectorMetrics>>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, metrics.render())
}

/// GET /healthz — simple liveness probe.
pub async fn healthz_handler() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

pub fn router(metrics: Arc<CollectorMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(metrics)
}
