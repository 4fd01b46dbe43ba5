// Bounded, chronologically ordered sample history
use super::sample::Sample;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    samples: VecDeque<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// The newest `count` samples, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &Sample> {
        self.samples.iter().skip(self.samples.len().saturating_sub(count))
    }

    /// Append at the end, then evict from the front until at most `max_points` remain.
    pub fn push_bounded(&mut self, sample: Sample, max_points: usize) {
        self.samples.push_back(sample);
        self.truncate_front(max_points);
    }

    /// Keep only the newest `max_points` samples.
    pub fn truncate_front(&mut self, max_points: usize) {
        while self.samples.len() > max_points {
            self.samples.pop_front();
        }
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series_of(len: usize) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        (0..len)
            .map(|i| Sample::new(start + Duration::seconds(i as i64 * 5), 100 + i as i64, 50, 60.0, 20.0))
            .collect()
    }

    #[test]
    fn test_push_bounded_evicts_oldest_first() {
        let mut series = series_of(3);
        let extra = Sample::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap(),
            999,
            50,
            60.0,
            20.0,
        );
        series.push_bounded(extra.clone(), 3);

        assert_eq!(series.len(), 3);
        assert_eq!(series.first().map(|s| s.energy), Some(101));
        assert_eq!(series.latest(), Some(&extra));
    }

    #[test]
    fn test_push_bounded_grows_below_limit() {
        let mut series = series_of(2);
        let next = series_of(3).latest().cloned().unwrap();
        series.push_bounded(next, 10);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_tail_returns_newest_in_order() {
        let series = series_of(5);
        let energies: Vec<i64> = series.tail(2).map(|s| s.energy).collect();
        assert_eq!(energies, vec![103, 104]);

        assert_eq!(series.tail(50).count(), 5);
        assert_eq!(Series::new().tail(3).count(), 0);
    }
}
