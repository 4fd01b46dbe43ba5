// HTTP request handlers
use crate::infrastructure::http_response::{accepts_brotli, csv_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

const EXPORT_FILENAME: &str = "iot_timeseries.csv";

#[derive(Serialize)]
pub struct ResetResponse {
    pub rows: usize,
    pub persist_warning: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Tiles, charts and insights for the current snapshot
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.lock().await;
    Json(state.dashboard_service.build(&session.series, Utc::now())).into_response()
}

/// Full series, oldest first
pub async fn get_series(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.lock().await;
    Json(&session.series).into_response()
}

pub async fn get_insights(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.lock().await;
    Json(state.refresh_service.insights(&session.series)).into_response()
}

/// Run one seed/append/persist/analyze cycle
pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    match state.refresh().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!("Refresh cycle failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn reset(State(state): State<Arc<AppState>>) -> Response {
    match state.reset().await {
        Ok((rows, persist_warning)) => Json(ResetResponse {
            rows,
            persist_warning,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Reset failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Download the series in the persisted CSV format
pub async fn export_snapshot(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);
    let csv = {
        let session = state.session.lock().await;
        state.refresh_service.store().export_snapshot(&session.series)
    };

    match csv_response(csv, EXPORT_FILENAME, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
