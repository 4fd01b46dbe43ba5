// Insight engine - Rule evaluation over a series snapshot
use crate::domain::insight::{Insight, Severity};
use crate::domain::sample::Sample;
use crate::domain::series::Series;
use crate::domain::statistics::{mean, population_std_dev};
use crate::infrastructure::config::InsightSettings;
use chrono::{FixedOffset, Offset, Timelike, Utc};

#[derive(Debug, Clone)]
pub struct InsightEngine {
    settings: InsightSettings,
    offset: FixedOffset,
}

impl InsightEngine {
    pub fn new(settings: InsightSettings) -> Self {
        let offset = settings.utc_offset().unwrap_or_else(|| {
            tracing::warn!(
                "Invalid utc_offset_minutes {}, evaluating hours in UTC",
                settings.utc_offset_minutes
            );
            Utc.fix()
        });
        Self { settings, offset }
    }

    /// Evaluate every rule in declaration order. An empty series yields no insights.
    pub fn analyze(&self, series: &Series) -> Vec<Insight> {
        let Some(last) = series.latest() else {
            return Vec::new();
        };

        let mut insights: Vec<Insight> = [
            self.energy_surge(series, last),
            self.water_anomaly(series, last),
            self.overnight_lighting(series),
            self.low_engagement(last),
        ]
        .into_iter()
        .flatten()
        .collect();

        if insights.is_empty() {
            insights.push(Insight::new(
                Severity::Ok,
                "All systems within expected ranges.",
            ));
        }
        insights
    }

    fn energy_surge(&self, series: &Series, last: &Sample) -> Option<Insight> {
        let window: Vec<f64> = series
            .tail(self.settings.surge_window)
            .map(|s| s.energy as f64)
            .collect();
        let mean_energy = mean(&window)?;

        (last.energy as f64 > self.settings.surge_ratio * mean_energy).then(|| {
            Insight::new(
                Severity::Info,
                format!(
                    "Energy surge: {} kWh against a recent mean of {:.1} kWh. Consider shifting non-critical loads.",
                    last.energy, mean_energy
                ),
            )
        })
    }

    fn water_anomaly(&self, series: &Series, last: &Sample) -> Option<Insight> {
        let window: Vec<f64> = series
            .tail(self.settings.leak_window)
            .map(|s| s.water as f64)
            .collect();
        let std_dev = population_std_dev(&window)?;
        let threshold = mean(&window)? + self.settings.leak_sigma * std_dev;

        (last.water as f64 > threshold).then(|| {
            Insight::new(
                Severity::Alert,
                format!(
                    "Water anomaly: {} L exceeds the expected ceiling of {:.1} L. Possible leak.",
                    last.water, threshold
                ),
            )
        })
    }

    fn overnight_lighting(&self, series: &Series) -> Option<Insight> {
        let overnight: Vec<f64> = series
            .tail(self.settings.overnight_window)
            .filter(|s| self.is_overnight(s))
            .map(|s| s.lighting_pct)
            .collect();
        let mean_lighting = mean(&overnight)?;

        (mean_lighting > self.settings.overnight_lighting_pct).then(|| {
            Insight::new(
                Severity::Warning,
                format!(
                    "Overnight lighting averages {:.1}%. Schedule dimming to cut waste.",
                    mean_lighting
                ),
            )
        })
    }

    fn low_engagement(&self, last: &Sample) -> Option<Insight> {
        (last.live_metric < self.settings.low_engagement_pct).then(|| {
            Insight::new(
                Severity::Note,
                format!(
                    "Engagement is low at {:.1}%. Review space usage.",
                    last.live_metric
                ),
            )
        })
    }

    fn is_overnight(&self, sample: &Sample) -> bool {
        let hour = sample.timestamp.with_timezone(&self.offset).hour();
        self.settings.overnight_hours.contains(&hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn engine() -> InsightEngine {
        InsightEngine::new(InsightSettings::default())
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// Daytime series with steady readings; `edit` tweaks individual samples.
    fn steady(len: usize, start: DateTime<Utc>, edit: impl Fn(usize, &mut Sample)) -> Series {
        (0..len)
            .map(|i| {
                let mut s = Sample::new(start + Duration::seconds(i as i64 * 5), 150, 50, 55.0, 20.0);
                edit(i, &mut s);
                s
            })
            .collect()
    }

    fn severities(insights: &[Insight]) -> Vec<Severity> {
        insights.iter().map(|i| i.severity).collect()
    }

    #[test]
    fn test_empty_series_has_no_insights() {
        assert!(engine().analyze(&Series::new()).is_empty());
    }

    #[test]
    fn test_nominal_series_falls_back_to_ok() {
        let insights = engine().analyze(&steady(30, noon(), |_, _| {}));
        assert_eq!(severities(&insights), vec![Severity::Ok]);
    }

    #[test]
    fn test_single_sample_still_yields_insight() {
        let insights = engine().analyze(&steady(1, noon(), |_, _| {}));
        assert_eq!(severities(&insights), vec![Severity::Ok]);
    }

    #[test]
    fn test_water_spike_raises_leak_alert() {
        let series = steady(12, noon(), |i, s| {
            if i == 11 {
                s.water = 200;
            }
        });
        let insights = engine().analyze(&series);

        assert_eq!(severities(&insights), vec![Severity::Alert]);
        assert!(insights[0].text.contains("200 L"));
        assert!(insights[0].text.contains("leak"));
    }

    #[test]
    fn test_water_rule_only_looks_at_recent_window() {
        // Old volatility outside the 12-sample window must not mask the spike
        let series = steady(40, noon(), |i, s| {
            if i < 20 {
                s.water = if i % 2 == 0 { 5 } else { 400 };
            }
            if i == 39 {
                s.water = 200;
            }
        });
        assert!(severities(&engine().analyze(&series)).contains(&Severity::Alert));
    }

    #[test]
    fn test_energy_surge_reports_value_and_mean() {
        let series = steady(60, noon(), |i, s| {
            if i == 59 {
                s.energy = 400;
            }
        });
        let insights = engine().analyze(&series);

        assert_eq!(severities(&insights), vec![Severity::Info]);
        assert!(insights[0].text.contains("400 kWh"));
        // mean = (59 * 150 + 400) / 60
        assert!(insights[0].text.contains("154.2"));
    }

    #[test]
    fn test_overnight_lighting_waste() {
        let night = Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();
        let series = steady(20, night, |_, s| s.lighting_pct = 65.0);
        let insights = engine().analyze(&series);
        assert_eq!(severities(&insights), vec![Severity::Warning]);

        let series = steady(20, noon(), |_, s| s.lighting_pct = 65.0);
        assert_eq!(severities(&engine().analyze(&series)), vec![Severity::Ok]);
    }

    #[test]
    fn test_overnight_hours_follow_configured_offset() {
        // 20:00 UTC is 23:00 at UTC+3
        let evening = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        let series = steady(10, evening, |_, s| s.lighting_pct = 80.0);
        assert_eq!(severities(&engine().analyze(&series)), vec![Severity::Ok]);

        let settings = InsightSettings {
            utc_offset_minutes: 180,
            ..InsightSettings::default()
        };
        let shifted = InsightEngine::new(settings).analyze(&series);
        assert_eq!(severities(&shifted), vec![Severity::Warning]);
    }

    #[test]
    fn test_low_engagement_note() {
        let series = steady(5, noon(), |i, s| {
            if i == 4 {
                s.live_metric = 22.5;
            }
        });
        let insights = engine().analyze(&series);
        assert_eq!(severities(&insights), vec![Severity::Note]);
        assert!(insights[0].text.contains("22.5%"));
    }

    #[test]
    fn test_all_rules_fire_in_declaration_order() {
        let night = Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap();
        let series = steady(12, night, |i, s| {
            s.lighting_pct = 90.0;
            if i == 11 {
                s.energy = 600;
                s.water = 300;
                s.live_metric = 12.0;
            }
        });
        let insights = engine().analyze(&series);

        assert_eq!(
            severities(&insights),
            vec![Severity::Info, Severity::Alert, Severity::Warning, Severity::Note]
        );
        assert_eq!(insights, engine().analyze(&series));
    }
}
