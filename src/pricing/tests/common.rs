use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::pricing::calculator::{Clock, FeeCalculator};
use crate::pricing::classifier::PhenomenonClassifier;
use crate::pricing::domain::Observation;
use crate::pricing::seed;
use crate::pricing::store::InMemoryTariffStore;
use crate::pricing::weather::InMemoryObservationStore;

pub(super) struct FixedClock(pub(super) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// The canonical query instant used by calculator tests; observations are
/// stamped one hour earlier.
pub(super) fn query_time() -> DateTime<Utc> {
    at(2023, 3, 15, 12)
}

pub(super) fn tallinn_observation(
    air_temperature: f32,
    wind_speed: f32,
    phenomenon: &str,
) -> Observation {
    Observation {
        station: seed::TALLINN_STATION,
        air_temperature,
        wind_speed,
        phenomenon: phenomenon.to_string(),
        observed_at: at(2023, 3, 15, 11),
    }
}

pub(super) type ReferenceCalculator =
    FeeCalculator<InMemoryTariffStore, InMemoryTariffStore, InMemoryObservationStore>;

/// Calculator over the reference tariff with a single crafted observation.
pub(super) fn calculator_for(observation: Observation) -> ReferenceCalculator {
    let tariff = Arc::new(seed::reference_tariff());
    let observations = InMemoryObservationStore::new();
    observations.append(observation);
    FeeCalculator::new(
        tariff.clone(),
        tariff,
        Arc::new(observations),
        PhenomenonClassifier::reference(),
    )
}
