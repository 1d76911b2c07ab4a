use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{AllocationError, Booking, LedgerError};
use crate::flight::{CatalogError, Flight, NewFlight};
use crate::query::{AdminBooking, QueryError, RiderBooking};

/// Flight inventory access. The catalog exclusively owns flight records;
/// seat counts are mutated only through the allocator.
#[async_trait]
pub trait FlightCatalog: Send + Sync {
    async fn create(&self, flight: NewFlight) -> Result<Flight, CatalogError>;

    /// Unconditional removal. Existing bookings referencing the flight are
    /// neither cascaded nor blocked; the read side copes with the dangling
    /// references.
    async fn remove(&self, flight_number: &str) -> Result<(), CatalogError>;

    async fn find_by_number(&self, flight_number: &str)
        -> Result<Option<Flight>, CatalogError>;

    /// Exact-match search on the opaque schedule string, ordered by flight
    /// number.
    async fn find_by_departure_time(&self, departure_time: &str)
        -> Result<Vec<Flight>, CatalogError>;
}

/// Append-only booking records. This layer records without validating;
/// seat availability is the allocator's responsibility.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn append(&self, flight_id: Uuid, rider_id: Uuid) -> Result<Booking, LedgerError>;

    async fn list_by_rider(&self, rider_id: Uuid) -> Result<Vec<Booking>, LedgerError>;

    async fn list_all(&self) -> Result<Vec<Booking>, LedgerError>;
}

/// The check-then-decrement-then-record protocol guarding oversell.
///
/// `book` is atomic: no concurrent caller observes the decrement without its
/// booking record or vice versa, and two calls racing for the last seat
/// resolve to exactly one success and one `SoldOut`.
#[async_trait]
pub trait SeatAllocator: Send + Sync {
    async fn book(&self, flight_number: &str, rider_id: Uuid)
        -> Result<Booking, AllocationError>;
}

/// Read-only joins over ledger + catalog (+ directory for the admin view).
#[async_trait]
pub trait BookingQueries: Send + Sync {
    async fn bookings_for_rider(&self, rider_id: Uuid)
        -> Result<Vec<RiderBooking>, QueryError>;

    async fn all_bookings(&self) -> Result<Vec<AdminBooking>, QueryError>;
}
