// Series store - Seeding, appending, trimming and persisting the sample history
use crate::application::simulator::Simulator;
use crate::application::snapshot_repository::{SnapshotError, SnapshotRepository};
use crate::domain::series::Series;
use crate::infrastructure::csv_snapshot;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

#[derive(Clone)]
pub struct SeriesStore {
    repository: Arc<dyn SnapshotRepository>,
    simulator: Simulator,
    max_points: usize,
}

impl SeriesStore {
    pub fn new(repository: Arc<dyn SnapshotRepository>, simulator: Simulator, max_points: usize) -> Self {
        Self {
            repository,
            simulator,
            max_points: max_points.max(1),
        }
    }

    pub fn seed(&self, row_count: usize, now: DateTime<Utc>, rng: &mut impl Rng) -> Series {
        self.simulator.seed(row_count, now, rng)
    }

    /// Read the persisted snapshot. Missing or unreadable data yields an empty series.
    pub fn load(&self) -> Series {
        match self.try_load() {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!("Discarding persisted series: {}", e);
                Series::new()
            }
        }
    }

    fn try_load(&self) -> Result<Series, SnapshotError> {
        let Some(contents) = self.repository.read()? else {
            tracing::info!("No persisted series found");
            return Ok(Series::new());
        };

        let mut series = csv_snapshot::decode(&contents)?;
        if series.len() > self.max_points {
            tracing::info!(
                "Trimming persisted series from {} to {} samples",
                series.len(),
                self.max_points
            );
            series.truncate_front(self.max_points);
        }

        let limits = self.simulator.limits();
        let out_of_range = series.iter().filter(|s| !limits.admits(s)).count();
        if out_of_range > 0 {
            tracing::warn!(
                "Clamping {} persisted samples outside the configured limits",
                out_of_range
            );
            series = series.iter().cloned().map(|s| limits.clamp(s)).collect();
        }
        Ok(series)
    }

    /// Append one simulated sample, evicting the oldest beyond `max_points`.
    pub fn append(&self, mut series: Series, now: DateTime<Utc>, rng: &mut impl Rng) -> Series {
        let sample = self.simulator.next_sample(series.latest(), now, rng);
        debug_assert!(self.simulator.limits().admits(&sample));
        series.push_bounded(sample, self.max_points);
        series
    }

    pub fn persist(&self, series: &Series) -> Result<(), SnapshotError> {
        self.repository.write(&csv_snapshot::encode(series))
    }

    /// Discard history, seed afresh and persist. The seeded series survives a failed write.
    pub fn reset(
        &self,
        row_count: usize,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> (Series, Result<(), SnapshotError>) {
        let series = self.seed(row_count, now, rng);
        let persisted = self.persist(&series);
        (series, persisted)
    }

    /// Same tabular format as the persisted snapshot, for download.
    pub fn export_snapshot(&self, series: &Series) -> String {
        csv_snapshot::encode(series)
    }
}
