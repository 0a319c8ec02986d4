use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for delivery regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Identifier wrapper for vehicle classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleClassId(pub u32);

/// WMO station code linking a region to its weather observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationCode(pub u32);

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rule version identifier, assigned by the store on insert. Resolution uses
/// it as the deterministic tie-break between versions sharing an
/// effective-from instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(pub u64);

/// A delivery region and the weather station whose observations price it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub station: StationCode,
}

/// A courier vehicle class. Weather surcharges are only ever considered when
/// `extra_fee_applicable` is true; a car pays the base fee in any weather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleClass {
    pub id: VehicleClassId,
    pub name: String,
    pub extra_fee_applicable: bool,
}

/// A single weather reading for a station. Observations are append-only and
/// multiple per station, ordered by `observed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: StationCode,
    /// Air temperature in degrees Celsius.
    pub air_temperature: f32,
    /// Wind speed in meters per second.
    pub wind_speed: f32,
    /// Free-text phenomenon description from the feed; may be empty.
    pub phenomenon: String,
    pub observed_at: DateTime<Utc>,
}

/// Closed set of surcharge categories a phenomenon description maps to.
/// `None` means "no phenomenon surcharge applies"; the engine does not
/// distinguish unknown descriptions from clear weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhenomenonCategory {
    None,
    Rain,
    SnowOrSleet,
    ThunderGlazeOrHail,
}

impl PhenomenonCategory {
    pub const fn label(self) -> &'static str {
        match self {
            PhenomenonCategory::None => "none",
            PhenomenonCategory::Rain => "rain",
            PhenomenonCategory::SnowOrSleet => "snow or sleet",
            PhenomenonCategory::ThunderGlazeOrHail => "thunder, glaze or hail",
        }
    }
}

impl fmt::Display for PhenomenonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
