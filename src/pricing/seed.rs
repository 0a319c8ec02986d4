//! Reference tariff and sample observations mirroring the Estonian pilot
//! configuration. Loaded outside production for demos and exercised heavily
//! by the test suite.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use super::domain::{Observation, PhenomenonCategory, StationCode, VehicleClassId};
use super::rules::{Band, FeeEffect};
use super::store::{BaseFeeDraft, InMemoryTariffStore, PhenomenonRuleDraft, RuleStore};
use super::weather::InMemoryObservationStore;

pub const TALLINN_STATION: StationCode = StationCode(26038);
pub const TARTU_STATION: StationCode = StationCode(26242);
pub const PARNU_STATION: StationCode = StationCode(41803);

fn rules_effective() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .expect("valid rule effective date")
}

/// Builds the reference tariff: three regions, three vehicle classes, and
/// the full reference rule set (base fees per region/vehicle, temperature
/// and wind bands, phenomenon surcharges).
pub fn reference_tariff() -> InMemoryTariffStore {
    let store = InMemoryTariffStore::new();
    let effective = rules_effective();

    let tallinn = store.add_region("Tallinn", TALLINN_STATION);
    let tartu = store.add_region("Tartu", TARTU_STATION);
    let parnu = store.add_region("Pärnu", PARNU_STATION);

    let car = store.add_vehicle_class("Car", false);
    let scooter = store.add_vehicle_class("Scooter", true);
    let bike = store.add_vehicle_class("Bike", true);

    let base_fees = [
        (tallinn.id, car.id, dec!(4.0)),
        (tallinn.id, scooter.id, dec!(3.5)),
        (tallinn.id, bike.id, dec!(3.0)),
        (tartu.id, car.id, dec!(3.5)),
        (tartu.id, scooter.id, dec!(3.0)),
        (tartu.id, bike.id, dec!(2.5)),
        (parnu.id, car.id, dec!(3.0)),
        (parnu.id, scooter.id, dec!(2.5)),
        (parnu.id, bike.id, dec!(2.0)),
    ];
    for (region, vehicle_class, amount) in base_fees {
        store
            .create_base_fee(BaseFeeDraft {
                region,
                vehicle_class,
                amount,
                effective_from: effective,
            })
            .expect("reference base fee inserts");
    }

    let surcharge_classes: BTreeSet<VehicleClassId> =
        [scooter.id, bike.id].into_iter().collect();

    // The historical temperature and wind bands share their boundary values
    // (-10 °C, 20 m/s), which the overlap check would reject; they go in
    // through the restore path. Resolution stays deterministic: the later
    // id wins at the shared boundary.
    store.load_temperature_rule(
        Band::at_most(-10.0),
        surcharge_classes.clone(),
        FeeEffect::Charge(dec!(1.0)),
        effective,
    );
    store.load_temperature_rule(
        Band::between(-10.0, 0.0).expect("valid temperature band"),
        surcharge_classes.clone(),
        FeeEffect::Charge(dec!(0.5)),
        effective,
    );

    let wind_classes: BTreeSet<VehicleClassId> = [bike.id].into_iter().collect();
    store.load_wind_speed_rule(
        Band::between(10.0, 20.0).expect("valid wind band"),
        wind_classes.clone(),
        FeeEffect::Charge(dec!(0.5)),
        effective,
    );
    store.load_wind_speed_rule(
        Band::at_least(20.0),
        wind_classes,
        FeeEffect::Forbidden,
        effective,
    );

    let phenomenon_rules = [
        (PhenomenonCategory::SnowOrSleet, FeeEffect::Charge(dec!(1.0))),
        (PhenomenonCategory::Rain, FeeEffect::Charge(dec!(0.5))),
        (PhenomenonCategory::ThunderGlazeOrHail, FeeEffect::Forbidden),
    ];
    for (category, effect) in phenomenon_rules {
        store
            .create_phenomenon_rule(PhenomenonRuleDraft {
                category,
                vehicle_classes: surcharge_classes.clone(),
                effect,
                effective_from: effective,
            })
            .expect("reference phenomenon rule inserts");
    }

    store
}

/// Sample 2023 observations for the three reference stations, one or two per
/// month, covering every surcharge and restriction path.
pub fn reference_observations() -> InMemoryObservationStore {
    let store = InMemoryObservationStore::new();
    let samples = [
        (TALLINN_STATION, -15.0, 5.0, "Heavy snow shower", 1673328000),
        (TARTU_STATION, -12.0, 8.0, "Moderate snowfall", 1676006400),
        (PARNU_STATION, -2.0, 6.0, "Light shower", 1678502400),
        (TALLINN_STATION, -3.0, 25.0, "Moderate snow shower", 1680921600),
        (TALLINN_STATION, 8.0, 7.0, "Light rain", 1681180800),
        (TALLINN_STATION, 6.0, 2.0, "Hail", 1683648000),
        (TARTU_STATION, 15.0, 3.0, "Clear", 1683859200),
        (PARNU_STATION, 18.0, 12.0, "Few clouds", 1686537600),
        (TALLINN_STATION, 25.0, 0.5, "Thunderstorm", 1689216000),
        (TARTU_STATION, 23.0, 3.0, "Thunder", 1690675200),
        (TARTU_STATION, 20.0, 12.0, "Heavy rain", 1691894400),
        (PARNU_STATION, 10.0, 15.0, "Variable clouds", 1694572800),
        (TALLINN_STATION, 5.0, 1.0, "Fog", 1697251200),
        (TARTU_STATION, 7.0, 23.0, "Light rain", 1699344000),
        (TARTU_STATION, -1.0, 4.0, "Moderate sleet", 1699843200),
        (PARNU_STATION, 0.0, 7.0, "Glaze", 1701715200),
        (PARNU_STATION, -5.0, 22.0, "Blowing snow", 1702521600),
    ];
    for (station, air_temperature, wind_speed, phenomenon, epoch) in samples {
        store.append(Observation {
            station,
            air_temperature,
            wind_speed,
            phenomenon: phenomenon.to_string(),
            observed_at: Utc
                .timestamp_opt(epoch, 0)
                .single()
                .expect("valid observation timestamp"),
        });
    }
    store
}
