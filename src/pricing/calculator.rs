use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::classifier::PhenomenonClassifier;
use super::domain::{Observation, PhenomenonCategory, StationCode, VehicleClass};
use super::resolver::resolve_in_force;
use super::rules::FeeEffect;
use super::store::{Catalog, RuleStore, StoreError};
use super::weather::ObservationStore;

/// Time source for the "use now when unspecified" default. Injected so the
/// orchestrator stays deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The condition that made a vehicle class unusable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ForbiddenReason {
    Phenomenon(PhenomenonCategory),
    WindSpeed(f32),
    Temperature(f32),
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::Phenomenon(category) => {
                write!(f, "weather phenomenon ({category})")
            }
            ForbiddenReason::WindSpeed(speed) => write!(f, "wind speed of {speed} m/s"),
            ForbiddenReason::Temperature(temperature) => {
                write!(f, "air temperature of {temperature} °C")
            }
        }
    }
}

/// Error raised by the quote orchestrator. `VehicleUsageForbidden` is
/// deliberately distinct from the not-found variants so callers can show a
/// specific message; everything here is non-retryable.
#[derive(Debug, thiserror::Error)]
pub enum FeeError {
    #[error("region not found: {0}")]
    UnknownRegion(String),
    #[error("vehicle class not found: {0}")]
    UnknownVehicleClass(String),
    #[error("no weather observation for station {station} at or before {at}")]
    NoObservation {
        station: StationCode,
        at: DateTime<Utc>,
    },
    #[error("no base fee configured for {region}/{vehicle_class}")]
    MissingBaseFee {
        region: String,
        vehicle_class: String,
    },
    #[error("usage of selected vehicle type is forbidden: {0}")]
    VehicleUsageForbidden(ForbiddenReason),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Itemized result of a fee calculation. Components carry their raw resolved
/// amounts; only the total is rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeQuote {
    pub region: String,
    pub vehicle_class: String,
    pub total: Decimal,
    pub base_fee: Decimal,
    pub temperature_extra: Decimal,
    pub wind_extra: Decimal,
    pub phenomenon_extra: Decimal,
    pub observation: Observation,
    pub quoted_at: DateTime<Utc>,
}

/// Orchestrates a quote: catalog lookups, the weather observation, base fee
/// resolution, and the three extra-fee families, with the forbidden
/// short-circuit.
pub struct FeeCalculator<C, R, O> {
    catalog: Arc<C>,
    rules: Arc<R>,
    observations: Arc<O>,
    classifier: PhenomenonClassifier,
    clock: Arc<dyn Clock>,
}

impl<C, R, O> FeeCalculator<C, R, O>
where
    C: Catalog,
    R: RuleStore,
    O: ObservationStore,
{
    pub fn new(
        catalog: Arc<C>,
        rules: Arc<R>,
        observations: Arc<O>,
        classifier: PhenomenonClassifier,
    ) -> Self {
        Self::with_clock(catalog, rules, observations, classifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<C>,
        rules: Arc<R>,
        observations: Arc<O>,
        classifier: PhenomenonClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            rules,
            observations,
            classifier,
            clock,
        }
    }

    /// Computes the delivery fee for a region and vehicle class as of `at`,
    /// defaulting to the injected clock's now.
    ///
    /// When more than one condition would independently forbid the vehicle,
    /// the reported reason follows a fixed order: phenomenon, then wind
    /// speed, then temperature.
    pub fn quote(
        &self,
        region_name: &str,
        vehicle_class_name: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<FeeQuote, FeeError> {
        let at = at.unwrap_or_else(|| self.clock.now());

        info!(
            region = region_name,
            vehicle_class = vehicle_class_name,
            %at,
            "calculating delivery fee"
        );

        let region = self
            .catalog
            .region_by_name(region_name)?
            .ok_or_else(|| FeeError::UnknownRegion(region_name.to_string()))?;
        let vehicle_class = self
            .catalog
            .vehicle_class_by_name(vehicle_class_name)?
            .ok_or_else(|| FeeError::UnknownVehicleClass(vehicle_class_name.to_string()))?;

        let observation = self
            .observations
            .latest_as_of(region.station, at)?
            .ok_or(FeeError::NoObservation {
                station: region.station,
                at,
            })?;
        debug!(
            station = %observation.station,
            air_temperature = observation.air_temperature,
            wind_speed = observation.wind_speed,
            phenomenon = observation.phenomenon,
            observed_at = %observation.observed_at,
            "using weather observation"
        );

        let base_fee = resolve_in_force(
            self.rules
                .base_fee_candidates(region.id, vehicle_class.id)?,
            at,
        )
        .map(|rule| rule.amount)
        .ok_or_else(|| FeeError::MissingBaseFee {
            region: region.name.clone(),
            vehicle_class: vehicle_class.name.clone(),
        })?;
        debug!(%base_fee, "resolved base fee");

        let (phenomenon_extra, wind_extra, temperature_extra) =
            if vehicle_class.extra_fee_applicable {
                // Evaluation order fixes which forbidden condition is
                // reported when several match.
                let phenomenon = self.phenomenon_extra(&observation, &vehicle_class, at)?;
                let wind = self.wind_extra(&observation, &vehicle_class, at)?;
                let temperature = self.temperature_extra(&observation, &vehicle_class, at)?;
                (phenomenon, wind, temperature)
            } else {
                debug!(
                    vehicle_class = vehicle_class.name,
                    "extra fees not applicable for vehicle class"
                );
                (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
            };

        let total = (base_fee + temperature_extra + wind_extra + phenomenon_extra)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        info!(
            %total,
            %base_fee,
            %temperature_extra,
            %wind_extra,
            %phenomenon_extra,
            "delivery fee calculated"
        );

        Ok(FeeQuote {
            region: region.name,
            vehicle_class: vehicle_class.name,
            total,
            base_fee,
            temperature_extra,
            wind_extra,
            phenomenon_extra,
            observation,
            quoted_at: at,
        })
    }

    fn phenomenon_extra(
        &self,
        observation: &Observation,
        vehicle_class: &VehicleClass,
        at: DateTime<Utc>,
    ) -> Result<Decimal, FeeError> {
        let category = self.classifier.classify(&observation.phenomenon);
        if category == PhenomenonCategory::None {
            return Ok(Decimal::ZERO);
        }

        let resolved = resolve_in_force(
            self.rules.phenomenon_candidates(category, vehicle_class.id)?,
            at,
        );
        match resolved {
            None => Ok(Decimal::ZERO),
            Some(rule) => match rule.effect {
                FeeEffect::Charge(amount) => Ok(amount),
                FeeEffect::Forbidden => Err(FeeError::VehicleUsageForbidden(
                    ForbiddenReason::Phenomenon(category),
                )),
            },
        }
    }

    fn wind_extra(
        &self,
        observation: &Observation,
        vehicle_class: &VehicleClass,
        at: DateTime<Utc>,
    ) -> Result<Decimal, FeeError> {
        let resolved = resolve_in_force(
            self.rules
                .wind_speed_candidates(observation.wind_speed, vehicle_class.id)?,
            at,
        );
        match resolved {
            None => Ok(Decimal::ZERO),
            Some(rule) => match rule.effect {
                FeeEffect::Charge(amount) => Ok(amount),
                FeeEffect::Forbidden => Err(FeeError::VehicleUsageForbidden(
                    ForbiddenReason::WindSpeed(observation.wind_speed),
                )),
            },
        }
    }

    fn temperature_extra(
        &self,
        observation: &Observation,
        vehicle_class: &VehicleClass,
        at: DateTime<Utc>,
    ) -> Result<Decimal, FeeError> {
        let resolved = resolve_in_force(
            self.rules
                .temperature_candidates(observation.air_temperature, vehicle_class.id)?,
            at,
        );
        match resolved {
            None => Ok(Decimal::ZERO),
            Some(rule) => match rule.effect {
                FeeEffect::Charge(amount) => Ok(amount),
                // Not produced by current business rules, honored anyway.
                FeeEffect::Forbidden => Err(FeeError::VehicleUsageForbidden(
                    ForbiddenReason::Temperature(observation.air_temperature),
                )),
            },
        }
    }
}
