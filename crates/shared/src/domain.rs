use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

pub const MIN_PASSENGERS: i64 = 1;
pub const MAX_PASSENGERS: i64 = 10;

/// Empire State Building, used for both ends of the default ride.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    longitude: -73.985428,
    latitude: 40.748817,
};

/// Number of riders, always within `[MIN_PASSENGERS, MAX_PASSENGERS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PassengerCount(u8);

impl PassengerCount {
    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(MIN_PASSENGERS, MAX_PASSENGERS) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for PassengerCount {
    fn default() -> Self {
        Self(MIN_PASSENGERS as u8)
    }
}

impl fmt::Display for PassengerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A longitude/latitude pair. Ranges are not checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn midpoint(self, other: Coordinate) -> Coordinate {
        Coordinate {
            longitude: (self.longitude + other.longitude) / 2.0,
            latitude: (self.latitude + other.latitude) / 2.0,
        }
    }
}

/// The six ride parameters sent to the prediction endpoint.
///
/// Field names double as the query parameter names on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRequest {
    pub pickup_datetime: String,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: PassengerCount,
}

impl RideRequest {
    pub fn new(
        pickup_datetime: impl Into<String>,
        pickup: Coordinate,
        dropoff: Coordinate,
        passenger_count: PassengerCount,
    ) -> Self {
        Self {
            pickup_datetime: pickup_datetime.into(),
            pickup_longitude: pickup.longitude,
            pickup_latitude: pickup.latitude,
            dropoff_longitude: dropoff.longitude,
            dropoff_latitude: dropoff.latitude,
            passenger_count,
        }
    }

    pub fn pickup(&self) -> Coordinate {
        Coordinate::new(self.pickup_longitude, self.pickup_latitude)
    }

    pub fn dropoff(&self) -> Coordinate {
        Coordinate::new(self.dropoff_longitude, self.dropoff_latitude)
    }

    pub fn map_center(&self) -> Coordinate {
        self.pickup().midpoint(self.dropoff())
    }
}

impl Default for RideRequest {
    fn default() -> Self {
        Self::new(
            current_pickup_datetime(),
            DEFAULT_COORDINATE,
            DEFAULT_COORDINATE,
            PassengerCount::default(),
        )
    }
}

/// Renders a timestamp the way the form pre-fills the pickup field,
/// e.g. `2024-05-01 18:30:00.000000`.
pub fn format_pickup_datetime(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

pub fn current_pickup_datetime() -> String {
    format_pickup_datetime(Local::now())
}
