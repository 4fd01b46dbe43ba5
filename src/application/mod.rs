// Application layer - Use cases over the sample series
pub mod dashboard_service;
pub mod insight_engine;
pub mod refresh_service;
pub mod series_store;
pub mod simulator;
pub mod snapshot_repository;
