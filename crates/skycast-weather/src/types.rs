use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate.
///
/// Immutable once produced; a new acquisition yields a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    /// Upstream condition text, e.g. "scattered clouds".
    pub condition: String,
    /// Upstream icon code, opaque to this layer.
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

/// One forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    /// Probability of precipitation, 0..=100.
    pub precipitation_chance: u8,
}

/// Finite forecast horizon.
///
/// Samples are chronologically ascending exactly as the upstream source
/// returns them; they are never re-sorted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Collapse the samples into per-day high/low summaries.
    ///
    /// Relies on the chronological ordering of `samples`.
    pub fn daily(&self) -> Vec<DailySummary> {
        let mut days: Vec<DailySummary> = Vec::new();
        for sample in &self.samples {
            let date = sample.time.date_naive();
            match days.last_mut() {
                Some(day) if day.date == date => {
                    day.high = day.high.max(sample.temp_max);
                    day.low = day.low.min(sample.temp_min);
                }
                _ => days.push(DailySummary {
                    date,
                    high: sample.temp_max,
                    low: sample.temp_min,
                    condition: sample.condition.clone(),
                }),
            }
        }
        days
    }
}

/// High/low summary for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: String,
}

/// Reverse-geocoded place, in upstream relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceName {
    pub name: String,
    /// Administrative area (state/region), when the source reports one.
    pub state: Option<String>,
    pub country: String,
}

impl fmt::Display for PlaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            write!(f, ", {}", state)?;
        }
        write!(f, ", {}", self.country)
    }
}
