use axum::{
    middleware as axum_mw,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Performance analytics ───────────────────────────────
        .route(
            "/api/analytics/performance",
            get(handlers::analytics::query_metrics)
                .post(handlers::analytics::submit_metric),
        )
        .route(
            "/api/analytics/performance/stream",
            get(stream::performance_stream),
        )
        // ── Link previews ───────────────────────────────────────
        .route(
            "/api/preview",
            get(handlers::preview::get_preview)
                .post(handlers::preview::custom_preview),
        )
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
