use rust_decimal_macros::dec;
use std::sync::Arc;

use super::common::{at, calculator_for, query_time, tallinn_observation, FixedClock};
use crate::pricing::calculator::{FeeCalculator, FeeError, ForbiddenReason};
use crate::pricing::classifier::PhenomenonClassifier;
use crate::pricing::domain::PhenomenonCategory;
use crate::pricing::seed;
use crate::pricing::store::{BaseFeeDraft, InMemoryTariffStore, RuleStore};
use crate::pricing::weather::InMemoryObservationStore;

#[test]
fn car_pays_the_base_fee_only() {
    let calculator = calculator_for(tallinn_observation(-12.0, 22.0, "Thunderstorm"));

    // Extras never apply to cars, however hostile the weather.
    let quote = calculator
        .quote("Tallinn", "Car", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.total, dec!(4.00));
    assert_eq!(quote.base_fee, dec!(4.0));
    assert_eq!(quote.temperature_extra, dec!(0));
    assert_eq!(quote.wind_extra, dec!(0));
    assert_eq!(quote.phenomenon_extra, dec!(0));
}

#[test]
fn cold_weather_adds_the_temperature_extra_for_scooters() {
    let calculator = calculator_for(tallinn_observation(-12.0, 4.0, "Clear"));

    let quote = calculator
        .quote("Tallinn", "Scooter", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.total, dec!(4.50));
    assert_eq!(quote.temperature_extra, dec!(1.0));
}

#[test]
fn strong_wind_forbids_bikes() {
    let calculator = calculator_for(tallinn_observation(2.0, 22.0, "Clear"));

    let result = calculator.quote("Tallinn", "Bike", Some(query_time()));
    assert!(matches!(
        result,
        Err(FeeError::VehicleUsageForbidden(ForbiddenReason::WindSpeed(
            speed
        ))) if speed == 22.0
    ));
}

#[test]
fn thunder_forbids_scooters() {
    let calculator = calculator_for(tallinn_observation(15.0, 3.0, "Thunder"));

    let result = calculator.quote("Tallinn", "Scooter", Some(query_time()));
    assert!(matches!(
        result,
        Err(FeeError::VehicleUsageForbidden(
            ForbiddenReason::Phenomenon(PhenomenonCategory::ThunderGlazeOrHail)
        ))
    ));
}

#[test]
fn rain_and_moderate_wind_stack_for_bikes() {
    let calculator = calculator_for(tallinn_observation(5.0, 15.0, "Light rain"));

    let quote = calculator
        .quote("Tallinn", "Bike", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.total, dec!(4.00));
    assert_eq!(quote.base_fee, dec!(3.0));
    assert_eq!(quote.wind_extra, dec!(0.5));
    assert_eq!(quote.phenomenon_extra, dec!(0.5));
    assert_eq!(quote.temperature_extra, dec!(0));
}

#[test]
fn all_three_extras_stack_on_the_base_fee() {
    let calculator = calculator_for(tallinn_observation(-15.0, 15.0, "Heavy snow shower"));

    let quote = calculator
        .quote("Tallinn", "Bike", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.base_fee, dec!(3.0));
    assert_eq!(quote.temperature_extra, dec!(1.0));
    assert_eq!(quote.wind_extra, dec!(0.5));
    assert_eq!(quote.phenomenon_extra, dec!(1.0));
    assert_eq!(quote.total, dec!(5.50));
}

#[test]
fn shared_band_boundary_resolves_to_the_later_rule() {
    let calculator = calculator_for(tallinn_observation(-10.0, 4.0, "Clear"));

    // -10 °C sits on the edge of both temperature bands; the tie breaks
    // toward the most recently created rule, the [-10, 0] band.
    let quote = calculator
        .quote("Tallinn", "Scooter", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.temperature_extra, dec!(0.5));
    assert_eq!(quote.total, dec!(4.00));
}

#[test]
fn phenomenon_outranks_wind_when_both_forbid() {
    let calculator = calculator_for(tallinn_observation(20.0, 22.0, "Thunderstorm"));

    let result = calculator.quote("Tallinn", "Bike", Some(query_time()));
    assert!(matches!(
        result,
        Err(FeeError::VehicleUsageForbidden(
            ForbiddenReason::Phenomenon(_)
        ))
    ));
}

#[test]
fn unknown_names_are_reported_as_such() {
    let calculator = calculator_for(tallinn_observation(5.0, 4.0, "Clear"));

    let region = calculator.quote("Narva", "Bike", Some(query_time()));
    assert!(matches!(region, Err(FeeError::UnknownRegion(name)) if name == "Narva"));

    let vehicle = calculator.quote("Tallinn", "Unicycle", Some(query_time()));
    assert!(matches!(
        vehicle,
        Err(FeeError::UnknownVehicleClass(name)) if name == "Unicycle"
    ));
}

#[test]
fn missing_observation_fails_the_quote() {
    let calculator = calculator_for(tallinn_observation(5.0, 4.0, "Clear"));

    // The only observation is stamped at 11:00.
    let result = calculator.quote("Tallinn", "Bike", Some(at(2023, 3, 15, 10)));
    assert!(matches!(
        result,
        Err(FeeError::NoObservation { station, .. }) if station == seed::TALLINN_STATION
    ));
}

#[test]
fn missing_base_fee_is_a_distinct_error() {
    let tariff = Arc::new(InMemoryTariffStore::new());
    tariff.add_region("Tallinn", seed::TALLINN_STATION);
    tariff.add_vehicle_class("Bike", true);
    let observations = InMemoryObservationStore::new();
    observations.append(tallinn_observation(5.0, 4.0, "Clear"));

    let calculator = FeeCalculator::new(
        tariff.clone(),
        tariff,
        Arc::new(observations),
        PhenomenonClassifier::reference(),
    );
    let result = calculator.quote("Tallinn", "Bike", Some(query_time()));
    assert!(matches!(
        result,
        Err(FeeError::MissingBaseFee { region, vehicle_class })
            if region == "Tallinn" && vehicle_class == "Bike"
    ));
}

#[test]
fn omitted_query_time_falls_back_to_the_clock() {
    let tariff = Arc::new(seed::reference_tariff());
    let observations = InMemoryObservationStore::new();
    observations.append(tallinn_observation(5.0, 4.0, "Clear"));

    let calculator = FeeCalculator::with_clock(
        tariff.clone(),
        tariff,
        Arc::new(observations),
        PhenomenonClassifier::reference(),
        Arc::new(FixedClock(query_time())),
    );
    let quote = calculator
        .quote("Tallinn", "Bike", None)
        .expect("quote succeeds");
    assert_eq!(quote.quoted_at, query_time());
    assert_eq!(quote.total, dec!(3.00));
}

#[test]
fn totals_round_half_up_to_two_decimals() {
    let tariff = Arc::new(InMemoryTariffStore::new());
    let region = tariff.add_region("Tallinn", seed::TALLINN_STATION);
    let car = tariff.add_vehicle_class("Car", false);
    tariff
        .create_base_fee(BaseFeeDraft {
            region: region.id,
            vehicle_class: car.id,
            amount: dec!(4.005),
            effective_from: at(2023, 1, 1, 0),
        })
        .expect("base fee inserts");
    let observations = InMemoryObservationStore::new();
    observations.append(tallinn_observation(5.0, 4.0, "Clear"));

    let calculator = FeeCalculator::new(
        tariff.clone(),
        tariff,
        Arc::new(observations),
        PhenomenonClassifier::reference(),
    );
    let quote = calculator
        .quote("Tallinn", "Car", Some(query_time()))
        .expect("quote succeeds");
    assert_eq!(quote.total, dec!(4.01));
    // The unrounded component is preserved for the breakdown.
    assert_eq!(quote.base_fee, dec!(4.005));
}

#[test]
fn quotes_serialize_with_their_breakdown() {
    let calculator = calculator_for(tallinn_observation(-12.0, 4.0, "Clear"));

    let quote = calculator
        .quote("Tallinn", "Scooter", Some(query_time()))
        .expect("quote succeeds");
    let json = serde_json::to_value(&quote).expect("quote serializes");
    assert_eq!(json["region"], "Tallinn");
    assert_eq!(json["vehicle_class"], "Scooter");
    assert_eq!(json["total"], "4.5");
    assert_eq!(json["temperature_extra"], "1.0");
}
