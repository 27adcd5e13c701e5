//! Coordinate acquisition through a platform location capability.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;

use skycast_core::LocationError;

use crate::types::Coordinate;

const IP_LOOKUP_URL: &str = "http://ip-api.com/json";
const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Where coordinates come from.
///
/// Implementations wrap one platform capability (a geolocation service,
/// an IP lookup) behind a single asynchronous call.
#[allow(async_fn_in_trait)]
pub trait LocationSource {
    async fn locate(&self) -> Result<Coordinate, LocationError>;
}

/// Acquisition lifecycle for the current coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationStatus {
    Idle,
    Acquiring,
    Resolved(Coordinate),
    /// Terminal failure; distinguishes denied from unavailable.
    Failed(LocationError),
}

impl LocationStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, LocationStatus::Resolved(_))
    }
}

struct Inner {
    status: LocationStatus,
    last: Option<Coordinate>,
}

/// Owns the current coordinate and its acquisition state.
pub struct CoordinateProvider<S> {
    source: S,
    inner: Mutex<Inner>,
}

impl<S: LocationSource> CoordinateProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                status: LocationStatus::Idle,
                last: None,
            }),
        }
    }

    pub fn status(&self) -> LocationStatus {
        self.inner.lock().status.clone()
    }

    /// Last successfully acquired coordinate, if any.
    pub fn current(&self) -> Option<Coordinate> {
        self.inner.lock().last
    }

    /// Ask the source for a fresh coordinate.
    ///
    /// Any previous error state is cleared before the attempt resolves.
    /// At most one acquisition runs at a time; an overlapping call fails
    /// with `Unavailable` without contacting the source.
    pub async fn acquire(&self) -> Result<Coordinate, LocationError> {
        {
            let mut inner = self.inner.lock();
            if matches!(inner.status, LocationStatus::Acquiring) {
                return Err(LocationError::Unavailable(
                    "acquisition already in progress".to_string(),
                ));
            }
            inner.status = LocationStatus::Acquiring;
        }

        let result = self.source.locate().await;

        let mut inner = self.inner.lock();
        match &result {
            Ok(coord) => {
                tracing::info!(
                    latitude = coord.latitude,
                    longitude = coord.longitude,
                    "location acquired"
                );
                inner.last = Some(*coord);
                inner.status = LocationStatus::Resolved(*coord);
            }
            Err(error) => {
                tracing::warn!(%error, "location acquisition failed");
                inner.status = LocationStatus::Failed(error.clone());
            }
        }
        result
    }

    /// Re-run acquisition.
    ///
    /// Returns `None` while an acquisition is already in flight;
    /// overlapping attempts are not started.
    pub async fn retry(&self) -> Option<Result<Coordinate, LocationError>> {
        if matches!(self.status(), LocationStatus::Acquiring) {
            tracing::debug!("retry ignored, acquisition already in flight");
            return None;
        }
        Some(self.acquire().await)
    }
}

/// IP-based location lookup.
///
/// Stands in for a native geolocation binding on platforms without one.
/// Failures map to `Unavailable`; an IP lookup has no permission model.
pub struct IpLocationSource {
    client: reqwest::Client,
    endpoint: String,
}

impl IpLocationSource {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_endpoint(IP_LOOKUP_URL)
    }

    /// Lookup against a specific endpoint (used by tests).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl LocationSource for IpLocationSource {
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
            _ => Err(LocationError::Unavailable(
                "lookup response missing coordinates".to_string(),
            )),
        }
    }
}
