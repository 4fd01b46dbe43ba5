// Dashboard view models for tiles and charts
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: String, title: String, unit: String, value: f64, precision: i32) -> Self {
        Self {
            id,
            title,
            unit,
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    MultiLine,
}

impl ChartKind {
    pub fn from_config(kind: &str) -> Self {
        match kind {
            "multiLine" => ChartKind::MultiLine,
            _ => ChartKind::Line,
        }
    }
}

/// Downsample time series points using bucket averaging
pub fn downsample(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = points.len().div_ceil(max_points);
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        // Middle point's timestamp, average value
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;
        downsampled.push(TimeSeriesPoint::new(chunk[mid_idx].time_ms, avg_value));
    }

    downsampled
}
