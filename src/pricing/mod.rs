//! Delivery fee pricing: versioned rule families, temporal resolution, and
//! the quote orchestrator.

pub mod calculator;
pub mod classifier;
pub mod domain;
pub mod resolver;
pub mod rules;
pub mod seed;
pub mod store;
pub mod weather;

#[cfg(test)]
mod tests;

pub use calculator::{
    Clock, FeeCalculator, FeeError, FeeQuote, ForbiddenReason, SystemClock,
};
pub use classifier::PhenomenonClassifier;
pub use domain::{
    Observation, PhenomenonCategory, Region, RegionId, RuleId, StationCode, VehicleClass,
    VehicleClassId,
};
pub use resolver::resolve_in_force;
pub use rules::{
    Band, BaseFeeRule, FeeEffect, PhenomenonFeeRule, RuleShapeError, RuleVersion,
    TemperatureFeeRule, WindSpeedFeeRule,
};
pub use store::{
    BandRuleDraft, BaseFeeDraft, Catalog, InMemoryTariffStore, PhenomenonRuleDraft, RuleFamily,
    RuleStore, StoreError,
};
pub use weather::{InMemoryObservationStore, ObservationStore};
