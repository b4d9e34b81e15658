use axum::Router;

use backend_application::AppState;

use crate::handlers::{ingest_handlers, ops_handlers, stream_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/ingest/events",
            axum::routing::post(ingest_handlers::ingest_events),
        )
        .route(
            "/v1/stream/spikes",
            axum::routing::get(stream_handlers::stream_spikes),
        )
        .route(
            "/v1/ops/alert-deliveries",
            axum::routing::get(ops_handlers::list_alert_deliveries),
        )
        .route(
            "/v1/ops/alert-deliveries/last",
            axum::routing::get(ops_handlers::get_last_alert_delivery),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
