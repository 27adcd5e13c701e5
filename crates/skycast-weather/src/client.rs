//! HTTP client for the upstream weather and geocoding APIs.
//!
//! Stateless transport: each call issues one request and parses the
//! response into typed results. Credentials, base URLs, and units come
//! from [`WeatherConfig`]; nothing is read from the environment.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use skycast_core::{FetchError, ReqwestErrorExt, WeatherConfig};

use crate::types::{Coordinate, CurrentWeather, ForecastSample, ForecastSeries, PlaceName};

pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Fetch current conditions for a coordinate.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_current(&self, coord: &Coordinate) -> Result<CurrentWeather, FetchError> {
        let url = format!("{}/weather", self.config.weather_base_url);
        let response = self.get(&url, coord, &[]).await?;
        let body: ApiCurrent = Self::read_json(response).await?;
        let (condition, icon) = condition_of(&body.weather);

        Ok(CurrentWeather {
            temperature: body.main.temp,
            feels_like: body.main.feels_like,
            humidity: body.main.humidity,
            pressure: body.main.pressure,
            wind_speed: body.wind.speed,
            condition,
            icon,
            observed_at: chrono::DateTime::from_timestamp(body.dt, 0).unwrap_or_default(),
        })
    }

    /// Fetch the forecast horizon for a coordinate.
    ///
    /// The upstream list is chronologically ascending and is mapped in
    /// order, never re-sorted.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_forecast(&self, coord: &Coordinate) -> Result<ForecastSeries, FetchError> {
        let url = format!("{}/forecast", self.config.weather_base_url);
        let response = self.get(&url, coord, &[]).await?;
        let body: ApiForecast = Self::read_json(response).await?;

        let samples = body
            .list
            .into_iter()
            .map(|entry| {
                let (condition, _) = condition_of(&entry.weather);
                ForecastSample {
                    time: chrono::DateTime::from_timestamp(entry.dt, 0).unwrap_or_default(),
                    temperature: entry.main.temp,
                    temp_min: entry.main.temp_min,
                    temp_max: entry.main.temp_max,
                    condition,
                    precipitation_chance: (entry.pop * 100.0).round().clamp(0.0, 100.0) as u8,
                }
            })
            .collect();

        Ok(ForecastSeries { samples })
    }

    /// Resolve a coordinate to place names, in upstream relevance order.
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse_geocode(&self, coord: &Coordinate) -> Result<Vec<PlaceName>, FetchError> {
        let url = format!("{}/reverse", self.config.geocode_base_url);
        let response = self.get(&url, coord, &[("limit", "5")]).await?;
        let body: Vec<ApiPlace> = Self::read_json(response).await?;

        Ok(body
            .into_iter()
            .map(|place| PlaceName {
                name: place.name,
                state: place.state,
                country: place.country,
            })
            .collect())
    }

    async fn get(
        &self,
        url: &str,
        coord: &Coordinate,
        extra: &[(&str, &str)],
    ) -> Result<Response, FetchError> {
        let mut request = self.http.get(url).query(&[
            ("lat", coord.latitude.to_string()),
            ("lon", coord.longitude.to_string()),
            ("units", self.config.units.api_value().to_string()),
            ("appid", self.config.api_key.clone()),
        ]);
        if !extra.is_empty() {
            request = request.query(extra);
        }
        request.send().await.map_err(|e| e.into_fetch_error())
    }

    async fn read_json<D: DeserializeOwned>(response: Response) -> Result<D, FetchError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited { retry_after });
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "upstream returned an error status");
            return Err(FetchError::Upstream {
                status: status.as_u16(),
            });
        }
        response
            .json::<D>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn condition_of(weather: &[ApiCondition]) -> (String, String) {
    weather
        .first()
        .map(|c| (c.description.clone(), c.icon.clone()))
        .unwrap_or_else(|| ("unknown".to_string(), String::new()))
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    main: ApiMain,
    wind: ApiWind,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: u32,
    #[serde(default)]
    temp_min: f64,
    #[serde(default)]
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    list: Vec<ApiForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastEntry {
    dt: i64,
    main: ApiMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
    name: String,
    #[serde(default)]
    state: Option<String>,
    country: String,
}
