use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use skylane_catalog::MemoryCatalog;
use skylane_core::identity::CredentialStore;
use skylane_core::query::{AdminBooking, QueryError, RiderBooking, MISSING_RIDER_USERNAME};
use skylane_core::repository::BookingQueries;

use crate::ledger::MemoryLedger;

/// Read-side joins over the in-process engines. Missing flights drop the
/// entry; missing riders get the sentinel username. Read paths degrade
/// silently instead of failing the whole view.
pub struct MemoryQueries {
    catalog: Arc<MemoryCatalog>,
    ledger: Arc<MemoryLedger>,
    directory: Arc<dyn CredentialStore>,
}

impl MemoryQueries {
    pub fn new(
        catalog: Arc<MemoryCatalog>,
        ledger: Arc<MemoryLedger>,
        directory: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            directory,
        }
    }
}

#[async_trait]
impl BookingQueries for MemoryQueries {
    async fn bookings_for_rider(&self, rider_id: Uuid)
        -> Result<Vec<RiderBooking>, QueryError>
    {
        let mut views = Vec::new();
        for booking in self.ledger.list_by_rider(rider_id) {
            if let Some(flight) = self.catalog.find_by_id(booking.flight_id) {
                views.push(RiderBooking {
                    flight_number: flight.flight_number,
                    departure_time: flight.departure_time,
                });
            }
        }
        Ok(views)
    }

    async fn all_bookings(&self) -> Result<Vec<AdminBooking>, QueryError> {
        let mut views = Vec::new();
        for booking in self.ledger.list_all() {
            let Some(flight) = self.catalog.find_by_id(booking.flight_id) else {
                continue;
            };
            let username = self
                .directory
                .find_by_id(booking.user_id)
                .await
                .map_err(|e| QueryError::Storage(e.to_string()))?
                .map(|u| u.username)
                .unwrap_or_else(|| MISSING_RIDER_USERNAME.to_string());
            views.push(AdminBooking {
                flight_number: flight.flight_number,
                departure_time: flight.departure_time,
                user_id: booking.user_id,
                username,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use skylane_core::flight::NewFlight;
    use skylane_core::identity::MemoryCredentialStore;

    struct Harness {
        catalog: Arc<MemoryCatalog>,
        ledger: Arc<MemoryLedger>,
        directory: Arc<MemoryCredentialStore>,
        queries: MemoryQueries,
    }

    fn harness() -> Harness {
        let catalog = Arc::new(MemoryCatalog::new());
        let ledger = Arc::new(MemoryLedger::new());
        let directory = Arc::new(MemoryCredentialStore::new());
        let queries = MemoryQueries::new(
            catalog.clone(),
            ledger.clone(),
            directory.clone() as Arc<dyn CredentialStore>,
        );
        Harness {
            catalog,
            ledger,
            directory,
            queries,
        }
    }

    fn add_flight(catalog: &MemoryCatalog, number: &str, departure: &str) -> Uuid {
        catalog
            .create(NewFlight {
                flight_number: number.to_string(),
                departure_time: departure.to_string(),
                seat_count: 5,
            })
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn rider_view_drops_bookings_for_removed_flights() {
        let h = harness();
        let rider = h.directory.register("frida", "pw", false).await.unwrap();

        let kept = add_flight(&h.catalog, "SK100", "2026-09-01 09:00");
        let doomed = add_flight(&h.catalog, "SK200", "2026-09-02 10:00");
        h.ledger.append(kept, rider.id);
        h.ledger.append(doomed, rider.id);

        h.catalog.remove("SK200").unwrap();

        let views = h.queries.bookings_for_rider(rider.id).await.unwrap();
        assert_eq!(
            views,
            [RiderBooking {
                flight_number: "SK100".to_string(),
                departure_time: "2026-09-01 09:00".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn rider_view_is_scoped_to_the_rider() {
        let h = harness();
        let frida = h.directory.register("frida", "pw", false).await.unwrap();
        let malik = h.directory.register("malik", "pw", false).await.unwrap();

        let flight = add_flight(&h.catalog, "SK100", "2026-09-01 09:00");
        h.ledger.append(flight, frida.id);

        assert_eq!(h.queries.bookings_for_rider(frida.id).await.unwrap().len(), 1);
        assert!(h.queries.bookings_for_rider(malik.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_view_joins_usernames_and_sentinels_missing_riders() {
        let h = harness();
        let rider = h.directory.register("frida", "pw", false).await.unwrap();
        let flight = add_flight(&h.catalog, "SK100", "2026-09-01 09:00");

        h.ledger.append(flight, rider.id);
        let ghost = Uuid::new_v4();
        h.ledger.append(flight, ghost);

        let views = h.queries.all_bookings().await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].username, "frida");
        assert_eq!(views[0].user_id, rider.id);
        assert_eq!(views[1].username, MISSING_RIDER_USERNAME);
        assert_eq!(views[1].user_id, ghost);
        assert!(views.iter().all(|v| v.flight_number == "SK100"));
    }

    #[tokio::test]
    async fn admin_view_drops_bookings_for_removed_flights() {
        let h = harness();
        let rider = h.directory.register("frida", "pw", false).await.unwrap();
        let doomed = add_flight(&h.catalog, "SK200", "2026-09-02 10:00");
        h.ledger.append(doomed, rider.id);
        h.catalog.remove("SK200").unwrap();

        assert!(h.queries.all_bookings().await.unwrap().is_empty());
    }
}
