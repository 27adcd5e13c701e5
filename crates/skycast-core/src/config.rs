//! Configuration consumed by the weather core.
//!
//! All inputs are opaque values handed in from outside: an API
//! credential, base URLs, and a unit-system flag. The core reads no
//! environment variables and no config files itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_GEOCODE_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STALE_AFTER_SECS: u64 = 300;

/// Unit system for temperature and wind speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the upstream `units` query parameter.
    pub fn api_value(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Display suffix for temperatures in this system.
    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }
}

/// Settings for the weather client and caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Upstream API credential.
    pub api_key: String,
    /// Base URL for current-weather and forecast endpoints.
    pub weather_base_url: String,
    /// Base URL for the reverse-geocoding endpoint.
    pub geocode_base_url: String,
    pub units: UnitSystem,
    pub request_timeout_secs: u64,
    /// Age after which a cached query result is refetched on demand.
    pub stale_after_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            units: UnitSystem::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
        }
    }
}

impl WeatherConfig {
    /// Config with the given credential and defaults for everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Validate the configuration before constructing a client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSetting("api_key".to_string()));
        }
        for (field, value) in [
            ("weather_base_url", &self.weather_base_url),
            ("geocode_base_url", &self.geocode_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{}: {}", field, e)))?;
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
