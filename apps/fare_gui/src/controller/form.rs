//! Editable form fields backing the ride inputs.

use shared::domain::{
    current_pickup_datetime, Coordinate, PassengerCount, RideRequest, DEFAULT_COORDINATE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RideForm {
    pub pickup_datetime: String,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    /// Raw widget value; clamped when the request is built.
    pub passenger_count: i64,
}

impl Default for RideForm {
    fn default() -> Self {
        Self {
            pickup_datetime: current_pickup_datetime(),
            pickup_longitude: DEFAULT_COORDINATE.longitude,
            pickup_latitude: DEFAULT_COORDINATE.latitude,
            dropoff_longitude: DEFAULT_COORDINATE.longitude,
            dropoff_latitude: DEFAULT_COORDINATE.latitude,
            passenger_count: 1,
        }
    }
}

impl RideForm {
    pub fn pickup(&self) -> Coordinate {
        Coordinate::new(self.pickup_longitude, self.pickup_latitude)
    }

    pub fn dropoff(&self) -> Coordinate {
        Coordinate::new(self.dropoff_longitude, self.dropoff_latitude)
    }

    pub fn reset_pickup_to_now(&mut self) {
        self.pickup_datetime = current_pickup_datetime();
    }

    pub fn to_request(&self) -> RideRequest {
        RideRequest::new(
            self.pickup_datetime.clone(),
            self.pickup(),
            self.dropoff(),
            PassengerCount::clamped(self.passenger_count),
        )
    }
}
