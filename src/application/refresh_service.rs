// Refresh service - One seed/append/persist/analyze cycle per trigger
use crate::application::insight_engine::InsightEngine;
use crate::application::series_store::SeriesStore;
use crate::domain::insight::Insight;
use crate::domain::sample::Sample;
use crate::domain::series::Series;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub latest: Option<Sample>,
    pub insights: Vec<Insight>,
    /// Set when the snapshot could not be written; the in-memory series is still current.
    pub persist_warning: Option<String>,
}

#[derive(Clone)]
pub struct RefreshService {
    store: SeriesStore,
    engine: InsightEngine,
    seed_row_count: usize,
}

impl RefreshService {
    pub fn new(store: SeriesStore, engine: InsightEngine, seed_row_count: usize) -> Self {
        Self {
            store,
            engine,
            seed_row_count,
        }
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Startup: reload the persisted series, or seed and persist a fresh one.
    pub fn restore(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> Series {
        let series = self.store.load();
        if !series.is_empty() {
            tracing::info!("Restored {} persisted samples", series.len());
            return series;
        }

        let (series, persisted) = self.store.reset(self.seed_row_count, now, rng);
        match persisted {
            Ok(()) => tracing::info!("Seeded {} synthetic samples", series.len()),
            Err(e) => tracing::warn!("Seeded series could not be persisted: {}", e),
        }
        series
    }

    /// Seed if empty, append one sample, persist, then analyze the new snapshot.
    pub fn refresh(
        &self,
        series: Series,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> (Series, RefreshReport) {
        let series = if series.is_empty() {
            self.store.seed(self.seed_row_count, now, rng)
        } else {
            series
        };
        let series = self.store.append(series, now, rng);

        let persist_warning = self.store.persist(&series).err().map(|e| {
            tracing::warn!("Keeping in-memory series after persist failure: {}", e);
            e.to_string()
        });

        let insights = self.engine.analyze(&series);
        tracing::debug!(
            samples = series.len(),
            insights = insights.len(),
            "Refresh cycle complete"
        );

        let report = RefreshReport {
            latest: series.latest().cloned(),
            insights,
            persist_warning,
        };
        (series, report)
    }

    /// Reseed from scratch. Returns a warning if the fresh series could not be persisted.
    pub fn reset(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> (Series, Option<String>) {
        let (series, persisted) = self.store.reset(self.seed_row_count, now, rng);
        let warning = persisted.err().map(|e| {
            tracing::warn!("Reset series could not be persisted: {}", e);
            e.to_string()
        });
        tracing::info!("Series reset to {} samples", series.len());
        (series, warning)
    }

    pub fn insights(&self, series: &Series) -> Vec<Insight> {
        self.engine.analyze(series)
    }
}
