use std::sync::Arc;

use anyhow::Result;

use skycast_core::{AppError, WeatherConfig};
use skycast_dashboard::{WeatherOrchestrator, WeatherViewState};
use skycast_weather::{CoordinateProvider, IpLocationSource, WeatherClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    skycast_core::init()?;

    if let Err(error) = run().await {
        tracing::error!(%error, "skycast failed");
        eprintln!("{}", error.user_message());
        return Err(error.into());
    }
    Ok(())
}

async fn run() -> Result<(), AppError> {
    // The core reads no environment itself; the credential is resolved
    // here at the binary boundary and handed in.
    let api_key = std::env::var("OPENWEATHER_API_KEY").unwrap_or_default();
    let config = WeatherConfig::new(api_key);
    config.validate()?;

    let client = Arc::new(WeatherClient::new(config.clone())?);
    let provider = CoordinateProvider::new(IpLocationSource::new()?);
    let orchestrator = WeatherOrchestrator::new(provider, client, config.stale_after());

    tracing::info!("Skycast started");

    match orchestrator.load().await {
        WeatherViewState::Ready {
            current,
            forecast,
            place_name,
        } => {
            let unit = config.units.temperature_suffix();
            println!("Weather for {}", place_name);
            println!(
                "  {:.1}{} ({}), feels like {:.1}{}",
                current.temperature, unit, current.condition, current.feels_like, unit
            );
            println!(
                "  humidity {}%, wind {} m/s",
                current.humidity, current.wind_speed
            );
            for day in forecast.daily() {
                println!(
                    "  {}: {:.0}{} / {:.0}{} {}",
                    day.date, day.high, unit, day.low, unit, day.condition
                );
            }
        }
        WeatherViewState::PartialError { failed } => {
            let names: Vec<_> = failed.iter().map(|kind| kind.label()).collect();
            eprintln!("Some weather data failed to load: {}", names.join(", "));
        }
        WeatherViewState::LocationDenied(error) => {
            return Err(error.into());
        }
        other => {
            eprintln!("Weather not ready: {:?}", other);
        }
    }

    Ok(())
}
