//! Raw GTFS records as read from the feed.
//!
//! Only the columns the agency rules look at are kept; serde ignores the rest.

use serde::Deserialize;

/// A row of `stops.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawStop {
    /// Agency-prefixed code, e.g. "BOU29C".
    pub stop_id: String,
    #[serde(default)]
    pub stop_code: Option<String>,
    #[serde(rename = "stop_name", default)]
    pub name: String,
}

impl RawStop {
    pub fn new(stop_id: &str, stop_code: Option<&str>, name: &str) -> Self {
        Self {
            stop_id: stop_id.to_string(),
            stop_code: stop_code.map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// A row of `routes.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRoute {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    #[serde(default)]
    pub route_type: Option<u16>,
}

impl RawRoute {
    pub fn new(route_id: &str, route_short_name: &str, route_long_name: &str) -> Self {
        Self {
            route_id: route_id.to_string(),
            route_short_name: route_short_name.to_string(),
            route_long_name: route_long_name.to_string(),
            route_type: None,
        }
    }
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTrip {
    pub trip_id: String,
    pub route_id: String,
    #[serde(rename = "trip_headsign", default)]
    pub headsign: String,
    #[serde(default)]
    pub direction_id: Option<u8>,
    pub service_id: String,
}

impl RawTrip {
    /// Direction of travel, 0 when the feed leaves it blank.
    pub fn direction(&self) -> u8 {
        self.direction_id.unwrap_or(0)
    }
}

/// A row of `calendar.txt`. Dates are `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCalendar {
    pub service_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// A row of `calendar_dates.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCalendarDate {
    pub service_id: String,
    pub date: String,
    /// 1 = service added, 2 = service removed.
    pub exception_type: u8,
}

impl RawCalendarDate {
    pub fn is_addition(&self) -> bool {
        self.exception_type == 1
    }
}
