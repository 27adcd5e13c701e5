pub mod config;
pub mod error;

pub use config::{UnitSystem, WeatherConfig};
pub use error::{AppError, ConfigError, FetchError, LocationError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for binaries embedding the weather core.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
