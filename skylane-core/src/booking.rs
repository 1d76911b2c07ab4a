use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record pairing one rider with one seat consumed from one flight.
///
/// Bookings are append-only: never updated, never deleted. The references
/// are lookup keys, not ownership; the flight may be removed later and the
/// record stays behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage failure: {0}")]
    Storage(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("Flight not found: {0}")]
    FlightNotFound(String),

    #[error("No seats available on flight {0}")]
    SoldOut(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}
