use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use skylane_core::booking::{AllocationError, Booking};
use skylane_core::flight::CatalogError;
use skylane_core::repository::SeatAllocator;

use crate::booking_repo::PostgresLedger;
use crate::flight_repo::PostgresCatalog;
use crate::redis_repo::RedisClient;

/// Check-then-decrement-then-record in one Postgres transaction.
///
/// The conditional seat update takes the flight's row lock, so concurrent
/// bookings on one flight serialize there while other flights proceed. The
/// booking insert rides in the same transaction: both commit or neither.
pub struct PostgresAllocator {
    pool: PgPool,
    redis: Arc<RedisClient>,
}

impl PostgresAllocator {
    pub fn new(pool: PgPool, redis: Arc<RedisClient>) -> Self {
        Self { pool, redis }
    }
}

#[async_trait]
impl SeatAllocator for PostgresAllocator {
    async fn book(&self, flight_number: &str, rider_id: Uuid)
        -> Result<Booking, AllocationError>
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AllocationError::Storage(e.to_string()))?;

        let flight: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM flights WHERE flight_number = $1")
                .bind(flight_number)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AllocationError::Storage(e.to_string()))?;

        let (flight_id,) = flight
            .ok_or_else(|| AllocationError::FlightNotFound(flight_number.to_string()))?;

        // An early return drops the transaction, which rolls it back.
        PostgresCatalog::decrement_seat(&mut tx, flight_id)
            .await
            .map_err(|e| match e {
                CatalogError::SoldOut(_) => {
                    AllocationError::SoldOut(flight_number.to_string())
                }
                CatalogError::NotFound(_) => {
                    AllocationError::FlightNotFound(flight_number.to_string())
                }
                other => AllocationError::Storage(other.to_string()),
            })?;

        let booking = PostgresLedger::insert_booking(&mut tx, flight_id, rider_id)
            .await
            .map_err(|e| AllocationError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AllocationError::Storage(e.to_string()))?;

        // Keep the read-side cache in step; a miss just re-seeds from SQL.
        if let Err(err) = self
            .redis
            .decr_flight_availability(&flight_id.to_string())
            .await
        {
            warn!("availability cache decrement failed: {}", err);
        }

        info!(
            "booking {} recorded for flight {} rider {}",
            booking.id, flight_number, rider_id
        );
        Ok(booking)
    }
}
