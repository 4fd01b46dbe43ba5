// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::insight_engine::InsightEngine;
use crate::application::refresh_service::RefreshService;
use crate::application::series_store::SeriesStore;
use crate::application::simulator::Simulator;
use crate::domain::insight::Severity;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::file_repository::FileSnapshotRepository;
use crate::presentation::app_state::{AppState, Session};
use crate::presentation::routes::router;

/// Externally driven refresh trigger; each tick runs exactly one cycle.
async fn auto_refresh(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; the restored series is already current
    interval.tick().await;

    loop {
        interval.tick().await;
        match state.refresh().await {
            Ok(report) => {
                for insight in report.insights.iter().filter(|i| i.severity != Severity::Ok) {
                    tracing::info!("{}", insight);
                }
            }
            Err(e) => tracing::error!("Scheduled refresh failed: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let store_settings = &app_config.store;

    // Create repository (infrastructure layer)
    let repository = Arc::new(FileSnapshotRepository::new(store_settings.path.clone()));

    // Create services (application layer)
    let simulator = Simulator::new(app_config.limits, store_settings.update_interval_secs);
    let store = SeriesStore::new(repository, simulator, store_settings.max_points);
    let engine = InsightEngine::new(app_config.insights.clone());
    let refresh_service = RefreshService::new(store, engine.clone(), store_settings.seed_row_count);
    let dashboard_service = DashboardService::new(
        engine,
        app_config.dashboard.clone(),
        app_config.widgets.clone(),
    );

    let mut rng = match store_settings.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let series = refresh_service.restore(Utc::now(), &mut rng);

    // Create application state
    let state = Arc::new(AppState::new(
        refresh_service,
        dashboard_service,
        Session { series, rng },
    ));

    if app_config.server.auto_refresh {
        let period = Duration::from_secs(store_settings.update_interval_secs);
        tokio::spawn(auto_refresh(Arc::clone(&state), period));
        tracing::info!("Auto-refresh every {}s", store_settings.update_interval_secs);
    }

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!("Starting iot-insights service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
