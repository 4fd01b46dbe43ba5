// Simulated sensor readings: seeded random walks and per-step perturbation
use crate::domain::sample::{ChannelLimits, Sample, round_tenth};
use crate::domain::series::Series;
use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::Rng;

const ENERGY_FLOOR: i64 = 10;
const WATER_FLOOR: i64 = 5;
const LIVE_STEP_STD_DEV: f64 = 0.6;
const LIGHTING_STEP_STD_DEV: f64 = 2.5;

/// Offset and scale applied to a cumulative sum of standard-normal draws.
#[derive(Debug, Clone, Copy)]
struct WalkProfile {
    offset: f64,
    scale: f64,
}

impl WalkProfile {
    fn at(&self, walk: f64) -> f64 {
        self.offset + self.scale * walk
    }
}

const ENERGY_WALK: WalkProfile = WalkProfile { offset: 150.0, scale: 6.0 };
const WATER_WALK: WalkProfile = WalkProfile { offset: 80.0, scale: 5.0 };
const LIVE_WALK: WalkProfile = WalkProfile { offset: 55.0, scale: 1.5 };
const LIGHTING_WALK: WalkProfile = WalkProfile { offset: 35.0, scale: 2.5 };

#[derive(Debug, Clone)]
pub struct Simulator {
    limits: ChannelLimits,
    interval: Duration,
}

impl Simulator {
    pub fn new(limits: ChannelLimits, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs).unwrap_or(i64::MAX).max(1);
        Self {
            limits,
            interval: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
        }
    }

    pub fn limits(&self) -> &ChannelLimits {
        &self.limits
    }

    /// `row_count` samples spaced one interval apart, ending at `now`.
    ///
    /// Rows whose timestamp would fall outside the representable range are dropped
    /// from the old end.
    pub fn seed(&self, row_count: usize, now: DateTime<Utc>, rng: &mut impl Rng) -> Series {
        let end = truncate_to_second(now);
        let mut stamps: Vec<DateTime<Utc>> = (0..row_count.max(1))
            .map_while(|steps_back| self.steps_before(end, steps_back))
            .collect();
        if stamps.len() < row_count {
            tracing::warn!(
                "Seeding {} of {} requested samples; earlier timestamps are out of range",
                stamps.len(),
                row_count
            );
        }
        stamps.reverse();

        let mut walks = [0.0_f64; 4];
        stamps
            .into_iter()
            .map(|timestamp| {
                for walk in walks.iter_mut() {
                    *walk += standard_normal(rng);
                }
                self.clamped(
                    timestamp,
                    ENERGY_WALK.at(walks[0]).round() as i64,
                    WATER_WALK.at(walks[1]).round() as i64,
                    LIVE_WALK.at(walks[2]),
                    LIGHTING_WALK.at(walks[3]),
                )
            })
            .collect()
    }

    fn steps_before(&self, end: DateTime<Utc>, steps_back: usize) -> Option<DateTime<Utc>> {
        let span = self.interval.checked_mul(i32::try_from(steps_back).ok()?)?;
        end.checked_sub_signed(span)
    }

    /// Perturb `previous` (or the channel baseline) into the next reading.
    pub fn next_sample(
        &self,
        previous: Option<&Sample>,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Sample {
        let now = truncate_to_second(now);
        let timestamp = match previous {
            Some(prev) if now <= prev.timestamp => prev
                .timestamp
                .checked_add_signed(Duration::seconds(1))
                .unwrap_or(prev.timestamp),
            _ => now,
        };
        let base = previous.cloned().unwrap_or_else(|| self.baseline(timestamp));

        let energy = (base.energy.saturating_add(rng.gen_range(-15..=30))).max(ENERGY_FLOOR);
        let water = (base.water.saturating_add(rng.gen_range(-20..=40))).max(WATER_FLOOR);
        let live_metric = base.live_metric + LIVE_STEP_STD_DEV * standard_normal(rng);
        let lighting_pct = base.lighting_pct + LIGHTING_STEP_STD_DEV * standard_normal(rng);

        self.clamped(timestamp, energy, water, live_metric, lighting_pct)
    }

    fn baseline(&self, timestamp: DateTime<Utc>) -> Sample {
        self.clamped(
            timestamp,
            ENERGY_WALK.offset as i64,
            WATER_WALK.offset as i64,
            LIVE_WALK.offset,
            LIGHTING_WALK.offset,
        )
    }

    fn clamped(
        &self,
        timestamp: DateTime<Utc>,
        energy: i64,
        water: i64,
        live_metric: f64,
        lighting_pct: f64,
    ) -> Sample {
        self.limits.clamp(Sample::new(
            timestamp,
            energy,
            water,
            round_tenth(live_metric),
            round_tenth(lighting_pct),
        ))
    }
}

fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::seconds(1)).unwrap_or(ts)
}

/// Box-Muller transform over two uniform draws.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
