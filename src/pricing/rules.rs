use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::domain::{PhenomenonCategory, RegionId, RuleId, VehicleClassId};

/// Effect a matched rule applies: a surcharge amount, or an outright ban on
/// using the vehicle class under the matched condition. The two outcomes are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeeEffect {
    Charge(Decimal),
    Forbidden,
}

impl FeeEffect {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            FeeEffect::Charge(amount) => Some(*amount),
            FeeEffect::Forbidden => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, FeeEffect::Forbidden)
    }
}

/// Structural problems with a rule caught before it reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleShapeError {
    #[error("band minimum {min} exceeds maximum {max}")]
    InvertedBand { min: f32, max: f32 },
    #[error("extra-fee rule must apply to at least one vehicle class")]
    EmptyVehicleSet,
    #[error("fee amount {0} is negative")]
    NegativeAmount(Decimal),
}

/// Inclusive numeric band with optionally open ends. An open minimum reads
/// "at or below max"; an open maximum reads "at or above min"; both open
/// matches every value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    min: Option<f32>,
    max: Option<f32>,
}

impl Band {
    pub fn new(min: Option<f32>, max: Option<f32>) -> Result<Self, RuleShapeError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(RuleShapeError::InvertedBand { min, max });
            }
        }
        Ok(Self { min, max })
    }

    pub fn between(min: f32, max: f32) -> Result<Self, RuleShapeError> {
        Self::new(Some(min), Some(max))
    }

    pub const fn at_least(min: f32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: f32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub fn min(&self) -> Option<f32> {
        self.min
    }

    pub fn max(&self) -> Option<f32> {
        self.max
    }

    /// Both bounds are inclusive; an open bound always passes.
    pub fn contains(&self, value: f32) -> bool {
        let above_min = self.min.map_or(true, |min| value >= min);
        let below_max = self.max.map_or(true, |max| value <= max);
        above_min && below_max
    }

    /// Two bands intersect when each one's minimum sits at or below the
    /// other's maximum, open bounds passing unconditionally.
    pub fn intersects(&self, other: &Band) -> bool {
        let lower = match (self.min, other.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        let upper = match (other.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        lower && upper
    }
}

/// Common view over the versioning envelope every rule family shares, so a
/// single temporal-resolution algorithm serves all four.
pub trait RuleVersion {
    fn id(&self) -> RuleId;
    fn effective_from(&self) -> DateTime<Utc>;
    fn active(&self) -> bool;
}

/// Base delivery fee for one (region, vehicle class) pair. Never forbidden;
/// a missing base fee is a configuration error, not a zero fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseFeeRule {
    pub id: RuleId,
    pub region: RegionId,
    pub vehicle_class: VehicleClassId,
    pub amount: Decimal,
    pub effective_from: DateTime<Utc>,
    pub active: bool,
}

/// Air temperature surcharge over an inclusive band. Current business rules
/// never forbid on temperature, but the shape supports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureFeeRule {
    pub id: RuleId,
    pub band: Band,
    pub vehicle_classes: BTreeSet<VehicleClassId>,
    pub effect: FeeEffect,
    pub effective_from: DateTime<Utc>,
    pub active: bool,
}

/// Wind speed surcharge over an inclusive band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindSpeedFeeRule {
    pub id: RuleId,
    pub band: Band,
    pub vehicle_classes: BTreeSet<VehicleClassId>,
    pub effect: FeeEffect,
    pub effective_from: DateTime<Utc>,
    pub active: bool,
}

/// Phenomenon-category surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenomenonFeeRule {
    pub id: RuleId,
    pub category: PhenomenonCategory,
    pub vehicle_classes: BTreeSet<VehicleClassId>,
    pub effect: FeeEffect,
    pub effective_from: DateTime<Utc>,
    pub active: bool,
}

impl RuleVersion for BaseFeeRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn active(&self) -> bool {
        self.active
    }
}

impl RuleVersion for TemperatureFeeRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn active(&self) -> bool {
        self.active
    }
}

impl RuleVersion for WindSpeedFeeRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn active(&self) -> bool {
        self.active
    }
}

impl RuleVersion for PhenomenonFeeRule {
    fn id(&self) -> RuleId {
        self.id
    }

    fn effective_from(&self) -> DateTime<Utc> {
        self.effective_from
    }

    fn active(&self) -> bool {
        self.active
    }
}
