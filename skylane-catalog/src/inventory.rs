use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use skylane_core::flight::{CatalogError, Flight, NewFlight};
use skylane_core::repository::FlightCatalog;

/// In-process flight inventory.
///
/// Each flight lives behind its own mutex, so seat mutations serialize per
/// flight and never across the catalog. The allocator takes a flight's slot
/// and holds the lock across its whole decrement-and-record unit.
///
/// Lock order where both maps are touched: `numbers` before `flights`.
pub struct MemoryCatalog {
    flights: RwLock<HashMap<Uuid, Arc<Mutex<Flight>>>>,
    numbers: RwLock<HashMap<String, Uuid>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            flights: RwLock::new(HashMap::new()),
            numbers: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self, flight: NewFlight) -> Result<Flight, CatalogError> {
        flight.validate()?;

        let mut numbers = self.numbers.write().expect("catalog lock poisoned");
        if numbers.contains_key(&flight.flight_number) {
            return Err(CatalogError::DuplicateFlightNumber(flight.flight_number));
        }

        let record = Flight {
            id: Uuid::new_v4(),
            flight_number: flight.flight_number,
            departure_time: flight.departure_time,
            capacity: flight.seat_count,
            remaining_seats: flight.seat_count,
        };
        numbers.insert(record.flight_number.clone(), record.id);
        self.flights
            .write()
            .expect("catalog lock poisoned")
            .insert(record.id, Arc::new(Mutex::new(record.clone())));
        Ok(record)
    }

    /// Unconditional removal; bookings referencing the flight stay behind.
    pub fn remove(&self, flight_number: &str) -> Result<(), CatalogError> {
        let mut numbers = self.numbers.write().expect("catalog lock poisoned");
        let id = numbers
            .remove(flight_number)
            .ok_or_else(|| CatalogError::NotFound(flight_number.to_string()))?;
        self.flights
            .write()
            .expect("catalog lock poisoned")
            .remove(&id);
        Ok(())
    }

    pub fn find_by_number(&self, flight_number: &str) -> Option<Flight> {
        let numbers = self.numbers.read().expect("catalog lock poisoned");
        let id = *numbers.get(flight_number)?;
        drop(numbers);
        self.find_by_id(id)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Flight> {
        let flights = self.flights.read().expect("catalog lock poisoned");
        flights
            .get(&id)
            .map(|slot| slot.lock().expect("flight lock poisoned").clone())
    }

    /// Exact match on the schedule string, ordered by flight number.
    pub fn find_by_departure_time(&self, departure_time: &str) -> Vec<Flight> {
        let flights = self.flights.read().expect("catalog lock poisoned");
        let mut matches: Vec<Flight> = flights
            .values()
            .map(|slot| slot.lock().expect("flight lock poisoned").clone())
            .filter(|f| f.departure_time == departure_time)
            .collect();
        drop(flights);
        matches.sort_by(|a, b| a.flight_number.cmp(&b.flight_number));
        matches
    }

    /// The seat slot for a flight. Callers that need check-and-decrement to
    /// be atomic with further work (the allocator's ledger append) keep the
    /// slot locked until that work is done.
    pub fn seat_slot(&self, flight_number: &str) -> Option<Arc<Mutex<Flight>>> {
        let numbers = self.numbers.read().expect("catalog lock poisoned");
        let id = numbers.get(flight_number)?;
        self.flights
            .read()
            .expect("catalog lock poisoned")
            .get(id)
            .cloned()
    }

    /// Takes one seat; the new remaining count, or `SoldOut` at zero.
    pub fn decrement_seat(&self, flight_id: Uuid) -> Result<i32, CatalogError> {
        let slot = self
            .flights
            .read()
            .expect("catalog lock poisoned")
            .get(&flight_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(flight_id.to_string()))?;
        let mut flight = slot.lock().expect("flight lock poisoned");
        if flight.remaining_seats == 0 {
            return Err(CatalogError::SoldOut(flight.flight_number.clone()));
        }
        flight.remaining_seats -= 1;
        Ok(flight.remaining_seats)
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightCatalog for MemoryCatalog {
    async fn create(&self, flight: NewFlight) -> Result<Flight, CatalogError> {
        MemoryCatalog::create(self, flight)
    }

    async fn remove(&self, flight_number: &str) -> Result<(), CatalogError> {
        MemoryCatalog::remove(self, flight_number)
    }

    async fn find_by_number(&self, flight_number: &str)
        -> Result<Option<Flight>, CatalogError>
    {
        Ok(MemoryCatalog::find_by_number(self, flight_number))
    }

    async fn find_by_departure_time(&self, departure_time: &str)
        -> Result<Vec<Flight>, CatalogError>
    {
        Ok(MemoryCatalog::find_by_departure_time(self, departure_time))
    }
}
