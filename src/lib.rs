//! Weather-aware delivery fee engine.
//!
//! Combines a region/vehicle base fee with weather-driven surcharges, where
//! every fee parameter is a time-versioned business rule resolved "as of" the
//! request timestamp. The crate is the pricing core behind a thin transport
//! layer: callers hand it a region name, a vehicle class name, and an optional
//! timestamp, and receive either an itemized quote or a typed refusal.

pub mod config;
pub mod pricing;
pub mod telemetry;

pub use pricing::{FeeCalculator, FeeError, FeeQuote};
