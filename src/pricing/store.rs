use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::domain::{
    PhenomenonCategory, Region, RegionId, RuleId, StationCode, VehicleClass, VehicleClassId,
};
use super::rules::{
    Band, BaseFeeRule, FeeEffect, PhenomenonFeeRule, RuleShapeError, TemperatureFeeRule,
    WindSpeedFeeRule,
};

/// The four versioned rule families the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleFamily {
    BaseFee,
    Temperature,
    WindSpeed,
    Phenomenon,
}

impl RuleFamily {
    pub const fn label(self) -> &'static str {
        match self {
            RuleFamily::BaseFee => "base fee",
            RuleFamily::Temperature => "air temperature",
            RuleFamily::WindSpeed => "wind speed",
            RuleFamily::Phenomenon => "phenomenon",
        }
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an overlapping {family} rule already exists for this scope")]
    Conflict { family: RuleFamily },
    #[error("rule not found")]
    NotFound,
    #[error("unknown region or vehicle class referenced by rule")]
    UnknownScope,
    #[error(transparent)]
    InvalidRule(#[from] RuleShapeError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of reference data by display name, the way requests address it.
pub trait Catalog: Send + Sync {
    fn region_by_name(&self, name: &str) -> Result<Option<Region>, StoreError>;
    fn vehicle_class_by_name(&self, name: &str) -> Result<Option<VehicleClass>, StoreError>;
}

/// Submission shape for a new base fee version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseFeeDraft {
    pub region: RegionId,
    pub vehicle_class: VehicleClassId,
    pub amount: Decimal,
    pub effective_from: DateTime<Utc>,
}

/// Submission shape for a new band-scoped (temperature or wind) rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRuleDraft {
    pub band: Band,
    pub vehicle_classes: BTreeSet<VehicleClassId>,
    pub effect: FeeEffect,
    pub effective_from: DateTime<Utc>,
}

/// Submission shape for a new phenomenon-category rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenomenonRuleDraft {
    pub category: PhenomenonCategory,
    pub vehicle_classes: BTreeSet<VehicleClassId>,
    pub effect: FeeEffect,
    pub effective_from: DateTime<Utc>,
}

/// Storage contract for the versioned rule families.
///
/// `*_candidates` return every version whose scope matches the query,
/// regardless of effective-from or active state; temporal selection is the
/// resolver's job. `create_*` validate shape, run the family's overlap check,
/// and insert atomically with it. `delete_rule` is the administrative escape
/// hatch; rules are otherwise retired by deactivation or supersession.
pub trait RuleStore: Send + Sync {
    fn base_fee_candidates(
        &self,
        region: RegionId,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<BaseFeeRule>, StoreError>;

    fn temperature_candidates(
        &self,
        temperature: f32,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<TemperatureFeeRule>, StoreError>;

    fn wind_speed_candidates(
        &self,
        wind_speed: f32,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<WindSpeedFeeRule>, StoreError>;

    fn phenomenon_candidates(
        &self,
        category: PhenomenonCategory,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<PhenomenonFeeRule>, StoreError>;

    fn create_base_fee(&self, draft: BaseFeeDraft) -> Result<BaseFeeRule, StoreError>;

    fn create_temperature_rule(&self, draft: BandRuleDraft)
        -> Result<TemperatureFeeRule, StoreError>;

    fn create_wind_speed_rule(&self, draft: BandRuleDraft) -> Result<WindSpeedFeeRule, StoreError>;

    fn create_phenomenon_rule(
        &self,
        draft: PhenomenonRuleDraft,
    ) -> Result<PhenomenonFeeRule, StoreError>;

    fn delete_rule(&self, family: RuleFamily, id: RuleId) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct TariffState {
    regions: Vec<Region>,
    vehicle_classes: Vec<VehicleClass>,
    base_fees: Vec<BaseFeeRule>,
    temperature_rules: Vec<TemperatureFeeRule>,
    wind_speed_rules: Vec<WindSpeedFeeRule>,
    phenomenon_rules: Vec<PhenomenonFeeRule>,
    next_region_id: u32,
    next_vehicle_class_id: u32,
    next_rule_id: u64,
}

impl TariffState {
    fn next_rule_id(&mut self) -> RuleId {
        self.next_rule_id += 1;
        RuleId(self.next_rule_id)
    }
}

/// In-memory tariff storage.
///
/// One mutex guards the whole state, which makes every create's
/// read-check-then-insert atomic; that is the single-writer-per-scope
/// guarantee rule creation requires. The query path only ever takes the lock
/// for short clone-out reads.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTariffStore {
    inner: Arc<Mutex<TariffState>>,
}

impl InMemoryTariffStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&self, name: impl Into<String>, station: StationCode) -> Region {
        let mut state = self.lock();
        state.next_region_id += 1;
        let region = Region {
            id: RegionId(state.next_region_id),
            name: name.into(),
            station,
        };
        state.regions.push(region.clone());
        region
    }

    pub fn add_vehicle_class(
        &self,
        name: impl Into<String>,
        extra_fee_applicable: bool,
    ) -> VehicleClass {
        let mut state = self.lock();
        state.next_vehicle_class_id += 1;
        let vehicle_class = VehicleClass {
            id: VehicleClassId(state.next_vehicle_class_id),
            name: name.into(),
            extra_fee_applicable,
        };
        state.vehicle_classes.push(vehicle_class.clone());
        vehicle_class
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TariffState> {
        self.inner.lock().expect("tariff store mutex poisoned")
    }

    /// Loads a pre-existing temperature rule version without the overlap
    /// check. Restore path for persisted history, which may legitimately
    /// contain superseded versions the check would reject.
    pub(crate) fn load_temperature_rule(
        &self,
        band: Band,
        vehicle_classes: BTreeSet<VehicleClassId>,
        effect: FeeEffect,
        effective_from: DateTime<Utc>,
    ) -> TemperatureFeeRule {
        let mut state = self.lock();
        let rule = TemperatureFeeRule {
            id: state.next_rule_id(),
            band,
            vehicle_classes,
            effect,
            effective_from,
            active: true,
        };
        state.temperature_rules.push(rule.clone());
        rule
    }

    /// Wind-speed counterpart of [`Self::load_temperature_rule`].
    pub(crate) fn load_wind_speed_rule(
        &self,
        band: Band,
        vehicle_classes: BTreeSet<VehicleClassId>,
        effect: FeeEffect,
        effective_from: DateTime<Utc>,
    ) -> WindSpeedFeeRule {
        let mut state = self.lock();
        let rule = WindSpeedFeeRule {
            id: state.next_rule_id(),
            band,
            vehicle_classes,
            effect,
            effective_from,
            active: true,
        };
        state.wind_speed_rules.push(rule.clone());
        rule
    }
}

fn validate_effect(effect: &FeeEffect) -> Result<(), RuleShapeError> {
    if let FeeEffect::Charge(amount) = effect {
        if amount.is_sign_negative() {
            return Err(RuleShapeError::NegativeAmount(*amount));
        }
    }
    Ok(())
}

fn validate_vehicle_set(vehicle_classes: &BTreeSet<VehicleClassId>) -> Result<(), RuleShapeError> {
    if vehicle_classes.is_empty() {
        return Err(RuleShapeError::EmptyVehicleSet);
    }
    Ok(())
}

fn sets_intersect(a: &BTreeSet<VehicleClassId>, b: &BTreeSet<VehicleClassId>) -> bool {
    a.intersection(b).next().is_some()
}

impl Catalog for InMemoryTariffStore {
    fn region_by_name(&self, name: &str) -> Result<Option<Region>, StoreError> {
        let state = self.lock();
        Ok(state
            .regions
            .iter()
            .find(|region| region.name == name)
            .cloned())
    }

    fn vehicle_class_by_name(&self, name: &str) -> Result<Option<VehicleClass>, StoreError> {
        let state = self.lock();
        Ok(state
            .vehicle_classes
            .iter()
            .find(|vehicle_class| vehicle_class.name == name)
            .cloned())
    }
}

impl RuleStore for InMemoryTariffStore {
    fn base_fee_candidates(
        &self,
        region: RegionId,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<BaseFeeRule>, StoreError> {
        let state = self.lock();
        Ok(state
            .base_fees
            .iter()
            .filter(|rule| rule.region == region && rule.vehicle_class == vehicle_class)
            .cloned()
            .collect())
    }

    fn temperature_candidates(
        &self,
        temperature: f32,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<TemperatureFeeRule>, StoreError> {
        let state = self.lock();
        Ok(state
            .temperature_rules
            .iter()
            .filter(|rule| {
                rule.band.contains(temperature) && rule.vehicle_classes.contains(&vehicle_class)
            })
            .cloned()
            .collect())
    }

    fn wind_speed_candidates(
        &self,
        wind_speed: f32,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<WindSpeedFeeRule>, StoreError> {
        let state = self.lock();
        Ok(state
            .wind_speed_rules
            .iter()
            .filter(|rule| {
                rule.band.contains(wind_speed) && rule.vehicle_classes.contains(&vehicle_class)
            })
            .cloned()
            .collect())
    }

    fn phenomenon_candidates(
        &self,
        category: PhenomenonCategory,
        vehicle_class: VehicleClassId,
    ) -> Result<Vec<PhenomenonFeeRule>, StoreError> {
        let state = self.lock();
        Ok(state
            .phenomenon_rules
            .iter()
            .filter(|rule| {
                rule.category == category && rule.vehicle_classes.contains(&vehicle_class)
            })
            .cloned()
            .collect())
    }

    /// Base fee creation supersedes: the current active version for the
    /// (region, vehicle class) scope is deactivated and the new version
    /// inserted active. No overlap conflict exists in this family since the
    /// scope is an exact pair.
    fn create_base_fee(&self, draft: BaseFeeDraft) -> Result<BaseFeeRule, StoreError> {
        if draft.amount.is_sign_negative() {
            return Err(RuleShapeError::NegativeAmount(draft.amount).into());
        }

        let mut state = self.lock();
        if !state.regions.iter().any(|region| region.id == draft.region) {
            return Err(StoreError::UnknownScope);
        }
        if !state
            .vehicle_classes
            .iter()
            .any(|vehicle_class| vehicle_class.id == draft.vehicle_class)
        {
            return Err(StoreError::UnknownScope);
        }

        for rule in state
            .base_fees
            .iter_mut()
            .filter(|rule| rule.region == draft.region && rule.vehicle_class == draft.vehicle_class)
        {
            rule.active = false;
        }

        let rule = BaseFeeRule {
            id: state.next_rule_id(),
            region: draft.region,
            vehicle_class: draft.vehicle_class,
            amount: draft.amount,
            effective_from: draft.effective_from,
            active: true,
        };
        state.base_fees.push(rule.clone());
        Ok(rule)
    }

    fn create_temperature_rule(
        &self,
        draft: BandRuleDraft,
    ) -> Result<TemperatureFeeRule, StoreError> {
        validate_vehicle_set(&draft.vehicle_classes)?;
        validate_effect(&draft.effect)?;

        let mut state = self.lock();
        let overlaps = state.temperature_rules.iter().any(|rule| {
            rule.band.intersects(&draft.band)
                && sets_intersect(&rule.vehicle_classes, &draft.vehicle_classes)
        });
        if overlaps {
            return Err(StoreError::Conflict {
                family: RuleFamily::Temperature,
            });
        }

        let rule = TemperatureFeeRule {
            id: state.next_rule_id(),
            band: draft.band,
            vehicle_classes: draft.vehicle_classes,
            effect: draft.effect,
            effective_from: draft.effective_from,
            active: true,
        };
        state.temperature_rules.push(rule.clone());
        Ok(rule)
    }

    fn create_wind_speed_rule(&self, draft: BandRuleDraft) -> Result<WindSpeedFeeRule, StoreError> {
        validate_vehicle_set(&draft.vehicle_classes)?;
        validate_effect(&draft.effect)?;

        let mut state = self.lock();
        let overlaps = state.wind_speed_rules.iter().any(|rule| {
            rule.band.intersects(&draft.band)
                && sets_intersect(&rule.vehicle_classes, &draft.vehicle_classes)
        });
        if overlaps {
            return Err(StoreError::Conflict {
                family: RuleFamily::WindSpeed,
            });
        }

        let rule = WindSpeedFeeRule {
            id: state.next_rule_id(),
            band: draft.band,
            vehicle_classes: draft.vehicle_classes,
            effect: draft.effect,
            effective_from: draft.effective_from,
            active: true,
        };
        state.wind_speed_rules.push(rule.clone());
        Ok(rule)
    }

    fn create_phenomenon_rule(
        &self,
        draft: PhenomenonRuleDraft,
    ) -> Result<PhenomenonFeeRule, StoreError> {
        validate_vehicle_set(&draft.vehicle_classes)?;
        validate_effect(&draft.effect)?;

        let mut state = self.lock();
        let overlaps = state.phenomenon_rules.iter().any(|rule| {
            rule.category == draft.category
                && sets_intersect(&rule.vehicle_classes, &draft.vehicle_classes)
        });
        if overlaps {
            return Err(StoreError::Conflict {
                family: RuleFamily::Phenomenon,
            });
        }

        let rule = PhenomenonFeeRule {
            id: state.next_rule_id(),
            category: draft.category,
            vehicle_classes: draft.vehicle_classes,
            effect: draft.effect,
            effective_from: draft.effective_from,
            active: true,
        };
        state.phenomenon_rules.push(rule.clone());
        Ok(rule)
    }

    fn delete_rule(&self, family: RuleFamily, id: RuleId) -> Result<(), StoreError> {
        let mut state = self.lock();
        let removed = match family {
            RuleFamily::BaseFee => remove_by_id(&mut state.base_fees, |rule| rule.id == id),
            RuleFamily::Temperature => {
                remove_by_id(&mut state.temperature_rules, |rule| rule.id == id)
            }
            RuleFamily::WindSpeed => {
                remove_by_id(&mut state.wind_speed_rules, |rule| rule.id == id)
            }
            RuleFamily::Phenomenon => {
                remove_by_id(&mut state.phenomenon_rules, |rule| rule.id == id)
            }
        };
        if removed {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

fn remove_by_id<T>(rules: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    match rules.iter().position(matches) {
        Some(index) => {
            rules.remove(index);
            true
        }
        None => false,
    }
}
