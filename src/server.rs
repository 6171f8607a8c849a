use axum::{
    middleware as axum_mw,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::handlers::{self, records::BASE_PATH};
use crate::middleware::track_metrics;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>, config: &ServiceConfig) -> Router {
    let interceptor = state.interceptor.clone();
    let item_path = format!("{BASE_PATH}/:id");

    Router::new()
        // ── Record endpoints ────────────────────────────────────
        .route(
            BASE_PATH,
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route(
            &item_path,
            get(handlers::records::get_record).put(handlers::records::update_record),
        )
        // ── Metrics ─────────────────────────────────────────────
        .route(&config.metrics.path, get(handlers::metrics::prometheus))
        .route("/api/metrics", get(handlers::metrics::get_metrics))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Serve the dashboard for everything else ─────────────
        .fallback_service(ServeDir::new(&config.server.static_dir))
        // ── Global middleware (applied bottom-up) ───────────────
        // CORS answers preflights itself, so metrics must sit outside it.
        .layer(CorsLayer::permissive())
        .layer(axum_mw::from_fn_with_state(interceptor, track_metrics))
        .layer(TraceLayer::new_for_http())
}
