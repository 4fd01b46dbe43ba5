// Domain layer - Samples, series, insights and dashboard view models
pub mod dashboard;
pub mod insight;
pub mod sample;
pub mod series;
pub mod statistics;
pub mod telemetry;
