use serde::Serialize;
use uuid::Uuid;

use crate::flight::Flight;

/// Username substituted into the admin audit view when a booking's rider
/// cannot be resolved.
pub const MISSING_RIDER_USERNAME: &str = "User not found";

/// Search projection: the externally visible flight identity plus how many
/// seats are still open.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub flight_number: String,
    pub seat_count: i32,
}

impl From<&Flight> for FlightSummary {
    fn from(flight: &Flight) -> Self {
        Self {
            flight_number: flight.flight_number.clone(),
            seat_count: flight.remaining_seats,
        }
    }
}

/// Rider-facing projection of a booking joined to its flight. Bookings whose
/// flight was removed are dropped from this view rather than surfaced as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiderBooking {
    pub flight_number: String,
    pub departure_time: String,
}

/// Admin audit projection of a booking joined to flight and rider identity.
#[derive(Debug, Clone, Serialize)]
pub struct AdminBooking {
    pub flight_number: String,
    pub departure_time: String,
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Storage failure: {0}")]
    Storage(String),
}
