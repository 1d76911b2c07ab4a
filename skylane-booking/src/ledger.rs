use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use skylane_core::booking::{Booking, LedgerError};
use skylane_core::repository::BookingLedger;

/// In-process append-only booking ledger. Insertion order is creation order,
/// which is what the listing operations promise.
#[derive(Default)]
pub struct MemoryLedger {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a booking. No validation here: the allocator owns the seat
    /// check and calls this while it still holds the flight's seat lock.
    pub fn append(&self, flight_id: Uuid, rider_id: Uuid) -> Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            flight_id,
            user_id: rider_id,
            created_at: Utc::now(),
        };
        self.bookings
            .write()
            .expect("ledger lock poisoned")
            .push(booking.clone());
        booking
    }

    pub fn list_by_rider(&self, rider_id: Uuid) -> Vec<Booking> {
        self.bookings
            .read()
            .expect("ledger lock poisoned")
            .iter()
            .filter(|b| b.user_id == rider_id)
            .cloned()
            .collect()
    }

    pub fn list_all(&self) -> Vec<Booking> {
        self.bookings.read().expect("ledger lock poisoned").clone()
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn append(&self, flight_id: Uuid, rider_id: Uuid) -> Result<Booking, LedgerError> {
        Ok(MemoryLedger::append(self, flight_id, rider_id))
    }

    async fn list_by_rider(&self, rider_id: Uuid) -> Result<Vec<Booking>, LedgerError> {
        Ok(MemoryLedger::list_by_rider(self, rider_id))
    }

    async fn list_all(&self) -> Result<Vec<Booking>, LedgerError> {
        Ok(MemoryLedger::list_all(self))
    }
}
