use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A schedulable service with a finite seat capacity.
///
/// `capacity` is fixed at creation; `remaining_seats` starts equal to it and
/// only ever decreases, one seat per booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    /// Opaque schedule string, matched exactly on search.
    pub departure_time: String,
    pub capacity: i32,
    pub remaining_seats: i32,
}

impl Flight {
    pub fn is_sold_out(&self) -> bool {
        self.remaining_seats == 0
    }
}

/// Input for flight creation, prior to identity assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlight {
    pub flight_number: String,
    pub departure_time: String,
    pub seat_count: i32,
}

impl NewFlight {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.flight_number.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "flight_number must not be empty".to_string(),
            ));
        }
        if self.departure_time.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "departure_time must not be empty".to_string(),
            ));
        }
        if self.seat_count <= 0 {
            return Err(CatalogError::InvalidInput(
                "seat_count must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Flight not found: {0}")]
    NotFound(String),

    #[error("Flight with the same number already exists: {0}")]
    DuplicateFlightNumber(String),

    #[error("Invalid flight data: {0}")]
    InvalidInput(String),

    #[error("No seats available on flight {0}")]
    SoldOut(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}
