use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use skylane_core::flight::{CatalogError, Flight, NewFlight};
use skylane_core::repository::FlightCatalog;

use crate::database::is_unique_violation;
use crate::redis_repo::RedisClient;

pub struct PostgresCatalog {
    pool: PgPool,
    redis: Arc<RedisClient>,
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    departure_time: String,
    capacity: i32,
    remaining_seats: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_number: row.flight_number,
            departure_time: row.departure_time,
            capacity: row.capacity,
            remaining_seats: row.remaining_seats,
        }
    }
}

impl PostgresCatalog {
    pub fn new(pool: PgPool, redis: Arc<RedisClient>) -> Self {
        Self { pool, redis }
    }

    /// One step of the allocator's transaction: take a seat if any is left.
    /// The conditional update locks the flight row, so concurrent bookings
    /// on the same flight serialize here and on no wider scope.
    pub async fn decrement_seat(
        tx: &mut Transaction<'_, Postgres>,
        flight_id: Uuid,
    ) -> Result<i32, CatalogError> {
        let remaining: Option<(i32,)> = sqlx::query_as(
            "UPDATE flights SET remaining_seats = remaining_seats - 1 \
             WHERE id = $1 AND remaining_seats > 0 RETURNING remaining_seats",
        )
        .bind(flight_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| CatalogError::Storage(e.to_string()))?;

        if let Some((remaining,)) = remaining {
            return Ok(remaining);
        }

        // Zero rows: either the flight is sold out or it vanished between
        // resolution and update.
        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT remaining_seats FROM flights WHERE id = $1")
                .bind(flight_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| CatalogError::Storage(e.to_string()))?;

        match exists {
            Some(_) => Err(CatalogError::SoldOut(flight_id.to_string())),
            None => Err(CatalogError::NotFound(flight_id.to_string())),
        }
    }
}

#[async_trait]
impl FlightCatalog for PostgresCatalog {
    async fn create(&self, flight: NewFlight) -> Result<Flight, CatalogError> {
        flight.validate()?;

        let row: FlightRow = sqlx::query_as(
            "INSERT INTO flights (id, flight_number, departure_time, capacity, remaining_seats) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id, flight_number, departure_time, capacity, remaining_seats",
        )
        .bind(Uuid::new_v4())
        .bind(&flight.flight_number)
        .bind(&flight.departure_time)
        .bind(flight.seat_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateFlightNumber(flight.flight_number.clone())
            } else {
                CatalogError::Storage(e.to_string())
            }
        })?;

        // Seed the read-side cache; a failure just means the next search
        // falls back to SQL.
        if let Err(err) = self
            .redis
            .set_flight_availability(&row.id.to_string(), row.remaining_seats)
            .await
        {
            warn!("availability cache seed failed: {}", err);
        }

        Ok(row.into())
    }

    async fn remove(&self, flight_number: &str) -> Result<(), CatalogError> {
        let removed: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM flights WHERE flight_number = $1 RETURNING id")
                .bind(flight_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| CatalogError::Storage(e.to_string()))?;

        let (id,) = removed.ok_or_else(|| CatalogError::NotFound(flight_number.to_string()))?;

        if let Err(err) = self.redis.delete_flight_availability(&id.to_string()).await {
            warn!("availability cache invalidation failed: {}", err);
        }

        Ok(())
    }

    async fn find_by_number(&self, flight_number: &str)
        -> Result<Option<Flight>, CatalogError>
    {
        let row: Option<FlightRow> = sqlx::query_as(
            "SELECT id, flight_number, departure_time, capacity, remaining_seats \
             FROM flights WHERE flight_number = $1",
        )
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(row.map(Flight::from))
    }

    async fn find_by_departure_time(&self, departure_time: &str)
        -> Result<Vec<Flight>, CatalogError>
    {
        let rows: Vec<FlightRow> = sqlx::query_as(
            "SELECT id, flight_number, departure_time, capacity, remaining_seats \
             FROM flights WHERE departure_time = $1 ORDER BY flight_number",
        )
        .bind(departure_time)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }
}
