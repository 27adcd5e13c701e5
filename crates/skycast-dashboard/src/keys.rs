//! Cache keys derived from a query kind and a coordinate.

use std::fmt;

use skycast_weather::Coordinate;

/// The three remote queries behind the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    Current,
    Forecast,
    Geocode,
}

impl QueryKind {
    pub fn label(&self) -> &'static str {
        match self {
            QueryKind::Current => "current",
            QueryKind::Forecast => "forecast",
            QueryKind::Geocode => "geocode",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key identifying one query for one exact coordinate.
///
/// The coordinate is stored as raw f64 bits so bitwise-equal inputs
/// always derive the same hashable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeatherKey {
    kind: QueryKind,
    lat_bits: u64,
    lon_bits: u64,
}

impl WeatherKey {
    pub fn new(kind: QueryKind, coord: Coordinate) -> Self {
        Self {
            kind,
            lat_bits: coord.latitude.to_bits(),
            lon_bits: coord.longitude.to_bits(),
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(f64::from_bits(self.lat_bits), f64::from_bits(self.lon_bits))
    }
}

impl fmt::Display for WeatherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.coordinate())
    }
}
