//! Coordinates location acquisition, the three remote queries, and the
//! folded view state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use skycast_core::FetchError;
use skycast_query::QueryCache;
use skycast_weather::{
    Coordinate, CoordinateProvider, CurrentWeather, ForecastSeries, LocationSource,
    LocationStatus, PlaceName, WeatherClient,
};

use crate::keys::{QueryKind, WeatherKey};
use crate::view::{fold_view, WeatherViewState};

/// Drives the three coordinate-keyed queries and publishes the folded
/// view state on every transition.
///
/// Owns its caches explicitly; there is no global state. The fold is
/// re-evaluated after each individual query completion, so partial
/// progress is observable by subscribers.
pub struct WeatherOrchestrator<S> {
    provider: CoordinateProvider<S>,
    client: Arc<WeatherClient>,
    current: QueryCache<WeatherKey, CurrentWeather, FetchError>,
    forecast: QueryCache<WeatherKey, ForecastSeries, FetchError>,
    geocode: QueryCache<WeatherKey, Vec<PlaceName>, FetchError>,
    view_tx: watch::Sender<WeatherViewState>,
}

impl<S: LocationSource> WeatherOrchestrator<S> {
    pub fn new(
        provider: CoordinateProvider<S>,
        client: Arc<WeatherClient>,
        stale_after: Duration,
    ) -> Self {
        let (view_tx, _) = watch::channel(WeatherViewState::LocationUnresolved);
        Self {
            provider,
            client,
            current: QueryCache::with_stale_after(stale_after),
            forecast: QueryCache::with_stale_after(stale_after),
            geocode: QueryCache::with_stale_after(stale_after),
            view_tx,
        }
    }

    /// Subscribe to view-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<WeatherViewState> {
        self.view_tx.subscribe()
    }

    /// Latest published view state.
    pub fn view(&self) -> WeatherViewState {
        self.view_tx.borrow().clone()
    }

    /// Acquire a coordinate and run the three queries, serving cached
    /// results where fresh ones exist.
    pub async fn load(&self) -> WeatherViewState {
        match self.provider.acquire().await {
            Ok(coord) => self.run_queries(coord, false).await,
            Err(_) => self.publish(),
        }
    }

    /// Re-acquire the coordinate and force-refresh all three queries.
    ///
    /// This is the only path that refetches already-successful data.
    /// Ignored while an acquisition is already in flight.
    pub async fn refresh_all(&self) -> WeatherViewState {
        match self.provider.retry().await {
            None => self.view(),
            Some(Ok(coord)) => self.run_queries(coord, true).await,
            Some(Err(_)) => self.publish(),
        }
    }

    async fn run_queries(&self, coord: Coordinate, force: bool) -> WeatherViewState {
        let current_key = WeatherKey::new(QueryKind::Current, coord);
        let forecast_key = WeatherKey::new(QueryKind::Forecast, coord);
        let geocode_key = WeatherKey::new(QueryKind::Geocode, coord);
        tracing::debug!(%current_key, force, "running coordinate queries");

        // One active coordinate at a time; entries keyed by an older
        // coordinate would otherwise accumulate across relocations.
        self.current.retain(|key| *key == current_key);
        self.forecast.retain(|key| *key == forecast_key);
        self.geocode.retain(|key| *key == geocode_key);

        self.publish();

        let current_fetch = {
            let client = Arc::clone(&self.client);
            move || {
                let client = Arc::clone(&client);
                async move { client.fetch_current(&coord).await }
            }
        };
        let forecast_fetch = {
            let client = Arc::clone(&self.client);
            move || {
                let client = Arc::clone(&client);
                async move { client.fetch_forecast(&coord).await }
            }
        };
        let geocode_fetch = {
            let client = Arc::clone(&self.client);
            move || {
                let client = Arc::clone(&client);
                async move { client.reverse_geocode(&coord).await }
            }
        };

        tokio::join!(
            async {
                let _ = if force {
                    self.current.refetch(current_key, current_fetch).await
                } else {
                    self.current.get_or_fetch(current_key, current_fetch).await
                };
                self.publish();
            },
            async {
                let _ = if force {
                    self.forecast.refetch(forecast_key, forecast_fetch).await
                } else {
                    self.forecast
                        .get_or_fetch(forecast_key, forecast_fetch)
                        .await
                };
                self.publish();
            },
            async {
                let _ = if force {
                    self.geocode.refetch(geocode_key, geocode_fetch).await
                } else {
                    self.geocode.get_or_fetch(geocode_key, geocode_fetch).await
                };
                self.publish();
            },
        );

        self.view()
    }

    /// Fold the latest statuses and publish if the view changed.
    fn publish(&self) -> WeatherViewState {
        let location = self.provider.status();
        let state = match &location {
            LocationStatus::Resolved(coord) => {
                let current = self
                    .current
                    .snapshot(&WeatherKey::new(QueryKind::Current, *coord));
                let forecast = self
                    .forecast
                    .snapshot(&WeatherKey::new(QueryKind::Forecast, *coord));
                let geocode = self
                    .geocode
                    .snapshot(&WeatherKey::new(QueryKind::Geocode, *coord));
                fold_view(
                    &location,
                    current.as_ref(),
                    forecast.as_ref(),
                    geocode.as_ref(),
                )
            }
            _ => fold_view(&location, None, None, None),
        };

        self.view_tx.send_if_modified(|view| {
            if *view == state {
                false
            } else {
                *view = state.clone();
                true
            }
        });
        state
    }
}
