// Dashboard domain model
use super::insight::Insight;
use super::telemetry::{ChartData, TileData};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
    pub insights: Vec<Insight>,
}

impl Dashboard {
    pub fn new(
        title: String,
        generated_at: DateTime<Utc>,
        tiles: Vec<TileData>,
        charts: Vec<ChartData>,
        insights: Vec<Insight>,
    ) -> Self {
        Self {
            title,
            generated_at,
            tiles,
            charts,
            insights,
        }
    }
}
