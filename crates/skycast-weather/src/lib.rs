//! Weather transport and location acquisition.
//!
//! Talks to the upstream weather, forecast, and reverse-geocoding
//! endpoints, and to the platform location capability. No caching or
//! retry policy lives here; both belong to the orchestration layer.

pub mod client;
pub mod location;
pub mod types;

pub use client::WeatherClient;
pub use location::{CoordinateProvider, IpLocationSource, LocationSource, LocationStatus};
pub use types::{
    Coordinate, CurrentWeather, DailySummary, ForecastSample, ForecastSeries, PlaceName,
};
