use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use skylane_core::query::{AdminBooking, QueryError, RiderBooking, MISSING_RIDER_USERNAME};
use skylane_core::repository::BookingQueries;

/// Read-side joins as indexed SQL instead of per-row lookups. The inner
/// join to flights drops bookings whose flight was removed; the left join
/// to users surfaces the sentinel for missing riders.
pub struct PostgresQueries {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RiderBookingRow {
    flight_number: String,
    departure_time: String,
}

#[derive(sqlx::FromRow)]
struct AdminBookingRow {
    flight_number: String,
    departure_time: String,
    user_id: Uuid,
    username: Option<String>,
}

impl PostgresQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingQueries for PostgresQueries {
    async fn bookings_for_rider(&self, rider_id: Uuid)
        -> Result<Vec<RiderBooking>, QueryError>
    {
        let rows: Vec<RiderBookingRow> = sqlx::query_as(
            "SELECT f.flight_number, f.departure_time \
             FROM bookings b \
             JOIN flights f ON f.id = b.flight_id \
             WHERE b.user_id = $1 \
             ORDER BY b.created_at",
        )
        .bind(rider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| RiderBooking {
                flight_number: row.flight_number,
                departure_time: row.departure_time,
            })
            .collect())
    }

    async fn all_bookings(&self) -> Result<Vec<AdminBooking>, QueryError> {
        let rows: Vec<AdminBookingRow> = sqlx::query_as(
            "SELECT f.flight_number, f.departure_time, b.user_id, u.username \
             FROM bookings b \
             JOIN flights f ON f.id = b.flight_id \
             LEFT JOIN users u ON u.id = b.user_id \
             ORDER BY b.created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| QueryError::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| AdminBooking {
                flight_number: row.flight_number,
                departure_time: row.departure_time,
                user_id: row.user_id,
                username: row
                    .username
                    .unwrap_or_else(|| MISSING_RIDER_USERNAME.to_string()),
            })
            .collect())
    }
}
