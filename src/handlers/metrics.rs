use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::metrics::{encode_text, HistogramSnapshot};
use crate::AppState;

use super::AppError;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

// ─── GET /metrics ────────────────────────────────────────────────
/// Prometheus scrape target. The route is configurable (`metrics.path`).

pub async fn prometheus(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let body = encode_text(&state.metrics_registry)?;
    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}

// ─── GET /api/metrics ────────────────────────────────────────────
/// Returns a single JSON snapshot, handy for curl.

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<HistogramSnapshot> {
    Json(state.histogram.snapshot())
}
