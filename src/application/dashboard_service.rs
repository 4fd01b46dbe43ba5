// Dashboard service - Use case for building the dashboard view from a series snapshot
use crate::application::insight_engine::InsightEngine;
use crate::domain::dashboard::Dashboard;
use crate::domain::sample::Sample;
use crate::domain::series::Series;
use crate::domain::telemetry::{ChartData, ChartKind, SeriesData, TileData, TimeSeriesPoint, downsample};
use crate::infrastructure::config::{ChartConfig, DashboardSettings, WidgetsConfig};
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct DashboardService {
    engine: InsightEngine,
    settings: DashboardSettings,
    widgets_config: WidgetsConfig,
}

impl DashboardService {
    pub fn new(engine: InsightEngine, settings: DashboardSettings, widgets_config: WidgetsConfig) -> Self {
        Self {
            engine,
            settings,
            widgets_config,
        }
    }

    pub fn build(&self, series: &Series, now: DateTime<Utc>) -> Dashboard {
        let tiles = series
            .latest()
            .map(|latest| self.build_tiles(latest))
            .unwrap_or_default();
        let window: Vec<&Sample> = series.tail(self.settings.chart_window).collect();
        let charts = self
            .widgets_config
            .charts
            .iter()
            .filter_map(|chart_config| self.build_chart(chart_config, &window))
            .collect();

        Dashboard::new(
            self.settings.title.clone(),
            now,
            tiles,
            charts,
            self.engine.analyze(series),
        )
    }

    fn build_tiles(&self, latest: &Sample) -> Vec<TileData> {
        self.widgets_config
            .tiles
            .iter()
            .map(|tile_config| {
                TileData::new(
                    tile_config.id.clone(),
                    tile_config.title.clone(),
                    tile_config.unit.clone(),
                    latest.value(tile_config.channel),
                    tile_config.precision,
                )
            })
            .collect()
    }

    fn build_chart(&self, chart_config: &ChartConfig, window: &[&Sample]) -> Option<ChartData> {
        if window.is_empty() {
            return None;
        }

        let series: Vec<SeriesData> = chart_config
            .series
            .iter()
            .map(|series_config| {
                let points = window
                    .iter()
                    .map(|s| {
                        TimeSeriesPoint::new(s.timestamp.timestamp_millis(), s.value(series_config.channel))
                    })
                    .collect();
                SeriesData::new(
                    series_config.id.clone(),
                    series_config.name.clone(),
                    series_config.color.clone(),
                    downsample(points, self.settings.max_points_per_series),
                )
            })
            .collect();

        // Only add chart if it has at least one series
        if series.is_empty() {
            return None;
        }

        Some(ChartData {
            id: chart_config.id.clone(),
            title: chart_config.title.clone(),
            unit: chart_config.unit.clone(),
            kind: ChartKind::from_config(&chart_config.kind),
            y_min: chart_config.y_min,
            y_max: chart_config.y_max,
            fraction_digits: chart_config.fraction_digits,
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::insight::Severity;
    use crate::infrastructure::config::InsightSettings;
    use chrono::{Duration, TimeZone};

    fn service(settings: DashboardSettings) -> DashboardService {
        DashboardService::new(
            InsightEngine::new(InsightSettings::default()),
            settings,
            WidgetsConfig::default(),
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn series_of(len: usize) -> Series {
        (0..len)
            .map(|i| {
                Sample::new(
                    noon() + Duration::seconds(i as i64 * 5),
                    150 + i as i64,
                    60,
                    55.0,
                    20.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_tiles_charts_or_insights() {
        let dashboard = service(DashboardSettings::default()).build(&Series::new(), noon());
        assert!(dashboard.tiles.is_empty());
        assert!(dashboard.charts.is_empty());
        assert!(dashboard.insights.is_empty());
        assert_eq!(dashboard.title, "IoT Live Dashboard");
    }

    #[test]
    fn test_tiles_show_latest_reading() {
        let dashboard = service(DashboardSettings::default()).build(&series_of(10), noon());

        let energy = dashboard.tiles.iter().find(|t| t.id == "energy").unwrap();
        assert_eq!(energy.value, 159.0);
        assert_eq!(energy.unit, "kWh");
        assert_eq!(dashboard.insights[0].severity, Severity::Ok);
    }

    #[test]
    fn test_charts_use_window_and_downsample() {
        let settings = DashboardSettings {
            chart_window: 40,
            max_points_per_series: 10,
            ..DashboardSettings::default()
        };
        let dashboard = service(settings).build(&series_of(100), noon());

        assert_eq!(dashboard.charts.len(), 2);
        let trends = &dashboard.charts[0];
        assert_eq!(trends.title, "Energy & Water Trends");
        assert_eq!(trends.kind, ChartKind::MultiLine);
        assert_eq!(trends.series.len(), 2);

        let energy = &trends.series[0];
        assert_eq!(energy.points.len(), 10);
        // Window starts at sample 60; first bucket averages samples 60-63
        assert_eq!(energy.points[0].value, 211.5);
    }
}
