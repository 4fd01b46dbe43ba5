// Sensor sample domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub energy: i64,
    pub water: i64,
    pub live_metric: f64,
    pub lighting_pct: f64,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Utc>,
        energy: i64,
        water: i64,
        live_metric: f64,
        lighting_pct: f64,
    ) -> Self {
        Self {
            timestamp,
            energy,
            water,
            live_metric,
            lighting_pct,
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Energy => self.energy as f64,
            Channel::Water => self.water as f64,
            Channel::LiveMetric => self.live_metric,
            Channel::LightingPct => self.lighting_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Energy,
    Water,
    LiveMetric,
    LightingPct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

impl FloatRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Clamp bounds for every channel of a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelLimits {
    pub energy: IntRange,
    pub water: IntRange,
    pub live_metric: FloatRange,
    pub lighting_pct: FloatRange,
}

impl Default for ChannelLimits {
    fn default() -> Self {
        Self {
            energy: IntRange::new(10, 1_000_000),
            water: IntRange::new(5, 1_000_000),
            live_metric: FloatRange::new(10.0, 100.0),
            lighting_pct: FloatRange::new(0.0, 100.0),
        }
    }
}

impl ChannelLimits {
    pub fn admits(&self, sample: &Sample) -> bool {
        self.energy.contains(sample.energy)
            && self.water.contains(sample.water)
            && self.live_metric.contains(sample.live_metric)
            && self.lighting_pct.contains(sample.lighting_pct)
    }

    /// Pull every channel of `sample` into range; the timestamp is untouched.
    pub fn clamp(&self, sample: Sample) -> Sample {
        Sample {
            energy: self.energy.clamp(sample.energy),
            water: self.water.clamp(sample.water),
            live_metric: self.live_metric.clamp(sample.live_metric),
            lighting_pct: self.lighting_pct.clamp(sample.lighting_pct),
            ..sample
        }
    }
}

/// Round to the one-decimal precision used by the snapshot format.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ranges_clamp_to_nearest_bound() {
        let energy = IntRange::new(10, 500);
        assert_eq!(energy.clamp(-3), 10);
        assert_eq!(energy.clamp(42), 42);
        assert_eq!(energy.clamp(900), 500);

        let pct = FloatRange::new(0.0, 100.0);
        assert_eq!(pct.clamp(-0.5), 0.0);
        assert_eq!(pct.clamp(100.7), 100.0);
    }

    #[test]
    fn test_limits_admit_only_in_range_samples() {
        let limits = ChannelLimits::default();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        assert!(limits.admits(&Sample::new(ts, 150, 80, 55.0, 35.0)));
        assert!(!limits.admits(&Sample::new(ts, 9, 80, 55.0, 35.0)));
        assert!(!limits.admits(&Sample::new(ts, 150, 80, 5.0, 35.0)));
    }

    #[test]
    fn test_limits_clamp_whole_sample() {
        let limits = ChannelLimits::default();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        let clamped = limits.clamp(Sample::new(ts, -500, 1, 250.0, -40.0));
        assert_eq!(clamped, Sample::new(ts, 10, 5, 100.0, 0.0));
        assert!(limits.admits(&clamped));

        let in_range = Sample::new(ts, 150, 80, 55.0, 35.0);
        assert_eq!(limits.clamp(in_range.clone()), in_range);
    }

    #[test]
    fn test_channel_value() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let sample = Sample::new(ts, 150, 80, 55.5, 35.2);
        assert_eq!(sample.value(Channel::Energy), 150.0);
        assert_eq!(sample.value(Channel::LightingPct), 35.2);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(12.34), 12.3);
        assert_eq!(round_tenth(12.36), 12.4);
        assert_eq!(round_tenth(-0.04), 0.0);
    }
}
