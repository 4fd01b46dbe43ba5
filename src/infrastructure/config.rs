use crate::domain::sample::{Channel, ChannelLimits};
use anyhow::{bail, ensure};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bounds keeping a full seed span (`interval * max_points`) well inside chrono's range.
pub const MAX_UPDATE_INTERVAL_SECS: u64 = 86_400;
pub const MAX_POINTS: usize = 1_000_000;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub limits: ChannelLimits,
    pub insights: InsightSettings,
    pub dashboard: DashboardSettings,
    pub widgets: WidgetsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Run a refresh cycle every `store.update_interval_secs`.
    pub auto_refresh: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            auto_refresh: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
    pub max_points: usize,
    pub update_interval_secs: u64,
    pub seed_row_count: usize,
    pub rng_seed: Option<u64>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/iot_timeseries.csv"),
            max_points: 600,
            update_interval_secs: 5,
            seed_row_count: 120,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InsightSettings {
    pub surge_window: usize,
    pub surge_ratio: f64,
    pub leak_window: usize,
    pub leak_sigma: f64,
    pub overnight_window: usize,
    pub overnight_hours: Vec<u32>,
    pub overnight_lighting_pct: f64,
    pub low_engagement_pct: f64,
    pub utc_offset_minutes: i32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            surge_window: 60,
            surge_ratio: 1.35,
            leak_window: 12,
            leak_sigma: 2.0,
            overnight_window: 60,
            overnight_hours: vec![23, 0, 1, 2, 3, 4, 5],
            overnight_lighting_pct: 40.0,
            low_engagement_pct: 30.0,
            utc_offset_minutes: 0,
        }
    }
}

impl InsightSettings {
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub title: String,
    pub chart_window: usize,
    pub max_points_per_series: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "IoT Live Dashboard".to_string(),
            chart_window: 120,
            max_points_per_series: 150,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WidgetsConfig {
    pub tiles: Vec<TileConfig>,
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileConfig {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub precision: i32,
    pub channel: Channel,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub kind: String,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub channel: Channel,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        let tile = |id: &str, title: &str, unit: &str, precision, channel| TileConfig {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            precision,
            channel,
        };
        let series = |id: &str, name: &str, color: &str, channel| SeriesConfig {
            id: id.to_string(),
            name: name.to_string(),
            color: Some(color.to_string()),
            channel,
        };

        Self {
            tiles: vec![
                tile("energy", "Energy Today", "kWh", 0, Channel::Energy),
                tile("water", "Water Today", "L", 0, Channel::Water),
                tile("live", "Occupancy", "%", 1, Channel::LiveMetric),
                tile("lighting", "Lighting", "%", 1, Channel::LightingPct),
            ],
            charts: vec![
                ChartConfig {
                    id: "energy_water".to_string(),
                    title: "Energy & Water Trends".to_string(),
                    unit: None,
                    kind: "multiLine".to_string(),
                    y_min: None,
                    y_max: None,
                    fraction_digits: Some(0),
                    series: vec![
                        series("energy", "Energy", "#f28e2b", Channel::Energy),
                        series("water", "Water", "#4e79a7", Channel::Water),
                    ],
                },
                ChartConfig {
                    id: "occupancy_lighting".to_string(),
                    title: "Occupancy & Lighting".to_string(),
                    unit: Some("%".to_string()),
                    kind: "multiLine".to_string(),
                    y_min: Some(0.0),
                    y_max: Some(100.0),
                    fraction_digits: Some(1),
                    series: vec![
                        series("live", "Occupancy", "#59a14f", Channel::LiveMetric),
                        series("lighting", "Lighting", "#edc948", Channel::LightingPct),
                    ],
                },
            ],
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD_*` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_from(config::File::with_name("config/dashboard").required(false))
}

pub fn load_app_config_from(path: &Path) -> anyhow::Result<AppConfig> {
    load_from(config::File::from(path))
}

fn load_from<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("insights.overnight_hours")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let store = &self.store;
        ensure!(
            (1..=MAX_POINTS).contains(&store.max_points),
            "store.max_points must be between 1 and {}",
            MAX_POINTS
        );
        ensure!(
            (1..=MAX_UPDATE_INTERVAL_SECS).contains(&store.update_interval_secs),
            "store.update_interval_secs must be between 1 and {}",
            MAX_UPDATE_INTERVAL_SECS
        );
        ensure!(
            (1..=store.max_points).contains(&store.seed_row_count),
            "store.seed_row_count must be between 1 and store.max_points ({})",
            store.max_points
        );

        let limits = &self.limits;
        ensure!(limits.energy.min <= limits.energy.max, "limits.energy: min exceeds max");
        ensure!(limits.water.min <= limits.water.max, "limits.water: min exceeds max");
        ensure!(
            limits.live_metric.min <= limits.live_metric.max,
            "limits.live_metric: min exceeds max"
        );
        ensure!(
            limits.lighting_pct.min <= limits.lighting_pct.max,
            "limits.lighting_pct: min exceeds max"
        );

        let insights = &self.insights;
        if insights.utc_offset().is_none() {
            bail!(
                "insights.utc_offset_minutes out of range: {}",
                insights.utc_offset_minutes
            );
        }
        if let Some(hour) = insights.overnight_hours.iter().find(|h| **h > 23) {
            bail!("insights.overnight_hours contains invalid hour {}", hour);
        }

        Ok(())
    }
}
