use std::fmt;

use chrono::{Local, NaiveDateTime, NaiveTime};

/// Format used for history timestamps and the local clock display.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for sunrise and sunset.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// One fully populated snapshot of current conditions for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u32,
    pub pressure_hpa: u32,
    pub condition: String,
    pub wind_speed_mps: f64,
    pub cloudiness_pct: u32,
    pub visibility_km: f64,
    /// Local wall-clock time.
    pub sunrise: NaiveTime,
    /// Local wall-clock time.
    pub sunset: NaiveTime,
}

/// A single line of the search history: `<city> at <yyyy-MM-dd HH:mm:ss>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub city: String,
    pub at: NaiveDateTime,
}

impl HistoryEntry {
    pub fn new(city: impl Into<String>, at: NaiveDateTime) -> Self {
        Self { city: city.into(), at }
    }

    /// Entry stamped with the current local time.
    pub fn now(city: impl Into<String>) -> Self {
        Self::new(city, Local::now().naive_local())
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.city, self.at.format(TIMESTAMP_FORMAT))
    }
}
