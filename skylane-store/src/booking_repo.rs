use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use skylane_core::booking::{Booking, LedgerError};
use skylane_core::repository::BookingLedger;

pub struct PostgresLedger {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    flight_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            flight_id: row.flight_id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Transaction step used by the allocator: the booking insert that pairs
    /// with the seat decrement in the same transaction.
    pub async fn insert_booking(
        tx: &mut Transaction<'_, Postgres>,
        flight_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Booking, sqlx::Error> {
        let row: BookingRow = sqlx::query_as(
            "INSERT INTO bookings (id, flight_id, user_id) VALUES ($1, $2, $3) \
             RETURNING id, flight_id, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(flight_id)
        .bind(rider_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.into())
    }
}

#[async_trait]
impl BookingLedger for PostgresLedger {
    async fn append(&self, flight_id: Uuid, rider_id: Uuid) -> Result<Booking, LedgerError> {
        let row: BookingRow = sqlx::query_as(
            "INSERT INTO bookings (id, flight_id, user_id) VALUES ($1, $2, $3) \
             RETURNING id, flight_id, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(flight_id)
        .bind(rider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        Ok(row.into())
    }

    async fn list_by_rider(&self, rider_id: Uuid) -> Result<Vec<Booking>, LedgerError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT id, flight_id, user_id, created_at FROM bookings \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(rider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, LedgerError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT id, flight_id, user_id, created_at FROM bookings ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}
