use std::env;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the pricing engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_reference_data = match env::var("PRICING_SEED_REFERENCE_DATA") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidSeedFlag { value: raw })?,
            Err(_) => environment != AppEnvironment::Production,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            pricing: PricingConfig {
                seed_reference_data,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Engine-level toggles.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Load the reference tariff and sample observations on startup. Defaults
    /// to true outside production, where rules come from real storage.
    pub seed_reference_data: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PRICING_SEED_REFERENCE_DATA must be a boolean, got '{value}'")]
    InvalidSeedFlag { value: String },
}
