use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use super::domain::{Observation, StationCode};
use super::store::StoreError;

/// Read-only view of the per-station observation time series.
pub trait ObservationStore: Send + Sync {
    /// Returns the observation with the greatest `observed_at` not exceeding
    /// `at` for the station, or `None` when the station has no observation
    /// that early. Callers treat `None` as a hard failure; no fee can be
    /// computed without weather context.
    fn latest_as_of(
        &self,
        station: StationCode,
        at: DateTime<Utc>,
    ) -> Result<Option<Observation>, StoreError>;
}

/// In-memory observation time series, populated by the external importer or
/// a seed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryObservationStore {
    observations: Arc<Mutex<Vec<Observation>>>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations are append-only; there is no update or delete.
    pub fn append(&self, observation: Observation) {
        self.observations
            .lock()
            .expect("observation store mutex poisoned")
            .push(observation);
    }
}

impl ObservationStore for InMemoryObservationStore {
    fn latest_as_of(
        &self,
        station: StationCode,
        at: DateTime<Utc>,
    ) -> Result<Option<Observation>, StoreError> {
        let observations = self
            .observations
            .lock()
            .expect("observation store mutex poisoned");
        Ok(observations
            .iter()
            .filter(|observation| observation.station == station && observation.observed_at <= at)
            .max_by_key(|observation| observation.observed_at)
            .cloned())
    }
}
