use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use skylane_catalog::MemoryCatalog;
use skylane_core::booking::{AllocationError, Booking};
use skylane_core::repository::SeatAllocator;

use crate::ledger::MemoryLedger;

/// Check-then-decrement-then-record over the in-process engines.
///
/// The flight's seat lock is held from the availability check until the
/// ledger append returns, so no concurrent caller ever observes a decrement
/// without its booking record. Bookings against different flights take
/// different locks and proceed independently.
pub struct MemoryAllocator {
    catalog: Arc<MemoryCatalog>,
    ledger: Arc<MemoryLedger>,
}

impl MemoryAllocator {
    pub fn new(catalog: Arc<MemoryCatalog>, ledger: Arc<MemoryLedger>) -> Self {
        Self { catalog, ledger }
    }

    pub fn book(&self, flight_number: &str, rider_id: Uuid)
        -> Result<Booking, AllocationError>
    {
        let slot = self
            .catalog
            .seat_slot(flight_number)
            .ok_or_else(|| AllocationError::FlightNotFound(flight_number.to_string()))?;

        let mut flight = slot.lock().expect("flight lock poisoned");
        if flight.remaining_seats == 0 {
            return Err(AllocationError::SoldOut(flight.flight_number.clone()));
        }
        flight.remaining_seats -= 1;
        Ok(self.ledger.append(flight.id, rider_id))
    }
}

#[async_trait]
impl SeatAllocator for MemoryAllocator {
    async fn book(&self, flight_number: &str, rider_id: Uuid)
        -> Result<Booking, AllocationError>
    {
        MemoryAllocator::book(self, flight_number, rider_id)
    }
}
