//! Folding location and query statuses into a single view state.

use skycast_core::{FetchError, LocationError};
use skycast_query::QueryState;
use skycast_weather::{CurrentWeather, ForecastSeries, LocationStatus, PlaceName};

use crate::keys::QueryKind;

/// Shown when reverse geocoding has not produced a name.
pub const UNKNOWN_PLACE: &str = "Unknown location";

/// What the presentation layer renders. Exactly one variant at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherViewState {
    /// No coordinate yet; acquisition is idle or still running.
    LocationUnresolved,
    /// Location acquisition failed; the whole view is blocked.
    LocationDenied(LocationError),
    Loading,
    /// Current or forecast failed; names which, for a retry banner.
    PartialError { failed: Vec<QueryKind> },
    Ready {
        current: CurrentWeather,
        forecast: ForecastSeries,
        place_name: String,
    },
}

impl WeatherViewState {
    pub fn is_ready(&self) -> bool {
        matches!(self, WeatherViewState::Ready { .. })
    }
}

type Snapshot<'a, T> = Option<&'a QueryState<T, FetchError>>;

/// Pure fold of the location status and the three query snapshots.
///
/// Priority order, first match wins: location not resolved, nothing
/// loaded yet, a blocking failure, then ready. Geocode never gates any
/// rule: a dangling or failed geocode neither holds the view in
/// `Loading` nor blocks `Ready`; the place name degrades to a
/// placeholder.
pub fn fold_view(
    location: &LocationStatus,
    current: Snapshot<'_, CurrentWeather>,
    forecast: Snapshot<'_, ForecastSeries>,
    geocode: Snapshot<'_, Vec<PlaceName>>,
) -> WeatherViewState {
    match location {
        LocationStatus::Idle | LocationStatus::Acquiring => {
            return WeatherViewState::LocationUnresolved;
        }
        LocationStatus::Failed(error) => {
            return WeatherViewState::LocationDenied(error.clone());
        }
        LocationStatus::Resolved(_) => {}
    }

    let any_pending = pending_or_missing(current) || pending_or_missing(forecast);
    let any_success = current.is_some_and(QueryState::is_success)
        || forecast.is_some_and(QueryState::is_success);
    if any_pending && !any_success {
        return WeatherViewState::Loading;
    }

    let mut failed = Vec::new();
    if current.is_some_and(QueryState::is_failure) {
        failed.push(QueryKind::Current);
    }
    if forecast.is_some_and(QueryState::is_failure) {
        failed.push(QueryKind::Forecast);
    }
    if !failed.is_empty() {
        return WeatherViewState::PartialError { failed };
    }

    if let (Some(QueryState::Success(current)), Some(QueryState::Success(forecast))) =
        (current, forecast)
    {
        let place_name = match geocode {
            Some(QueryState::Success(places)) => places
                .first()
                .map(PlaceName::to_string)
                .unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
            _ => UNKNOWN_PLACE.to_string(),
        };
        return WeatherViewState::Ready {
            current: current.clone(),
            forecast: forecast.clone(),
            place_name,
        };
    }

    // Mixed progress without failures: stay in the loading state.
    WeatherViewState::Loading
}

fn pending_or_missing<T>(snapshot: Snapshot<'_, T>) -> bool {
    snapshot.map_or(true, QueryState::is_pending)
}
