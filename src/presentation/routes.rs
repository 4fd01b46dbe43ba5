// Router construction
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export_snapshot, get_dashboard, get_insights, get_series, health_check, refresh, reset,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/series", get(get_series))
        .route("/insights", get(get_insights))
        .route("/refresh", post(refresh))
        .route("/reset", post(reset))
        .route("/export", get(export_snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
