use aerofacil_core::models::{Booking, BookingStatus};
use aerofacil_core::repository::BookingRepository;
use aerofacil_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::database::{is_unique_violation, storage_error};

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_id: Uuid,
    passenger_id: Uuid,
    seats_requested: i32,
    message_to_owner: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            trip_id: row.trip_id,
            passenger_id: row.passenger_id,
            seats_requested: row.seats_requested,
            message_to_owner: row.message_to_owner,
            status: row.status.parse::<BookingStatus>().map_err(CoreError::Storage)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn exists(&self, trip_id: Uuid, passenger_id: Uuid) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM bookings WHERE trip_id = $1 AND passenger_id = $2)",
        )
        .bind(trip_id)
        .bind(passenger_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)
    }

    async fn insert(&self, booking: &Booking) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (id, trip_id, passenger_id, seats_requested, message_to_owner, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(booking.passenger_id)
        .bind(booking.seats_requested)
        .bind(&booking.message_to_owner)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                // lost the check-then-insert race to a concurrent request
                warn!("Duplicate booking rejected for trip {} by {}", booking.trip_id, booking.passenger_id);
                Err(CoreError::AlreadyRequested)
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn list_for_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, trip_id, passenger_id, seats_requested, message_to_owner, status, created_at
            FROM bookings
            WHERE trip_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}
