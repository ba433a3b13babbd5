use aerofacil_core::models::{Trip, TripStatus};
use aerofacil_core::repository::TripRepository;
use aerofacil_core::search::{DateFilter, PageRequest, TripSearch};
use aerofacil_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::storage_error;

const TRIP_COLUMNS: &str = "id, owner_id, aircraft_id, origin, destination, departure_time, \
     arrival_time, available_seats, description, status, created_at";

pub struct PostgresTripRepository {
    pool: PgPool,
}

impl PostgresTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    owner_id: Uuid,
    aircraft_id: Uuid,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    available_seats: i32,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = CoreError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Trip {
            id: row.id,
            owner_id: row.owner_id,
            aircraft_id: row.aircraft_id,
            origin: row.origin,
            destination: row.destination,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            available_seats: row.available_seats,
            description: row.description,
            status: row.status.parse::<TripStatus>().map_err(CoreError::Storage)?,
            created_at: row.created_at,
        })
    }
}

fn into_trips(rows: Vec<TripRow>) -> CoreResult<Vec<Trip>> {
    rows.into_iter().map(Trip::try_from).collect()
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_listing_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &TripSearch, now: DateTime<Utc>) {
    qb.push(" WHERE status = ")
        .push_bind(TripStatus::Open.as_str())
        .push(" AND departure_time >= ")
        .push_bind(now);

    if let Some(origin) = &search.origin {
        qb.push(" AND origin ILIKE ").push_bind(like_pattern(origin));
    }
    if let Some(destination) = &search.destination {
        qb.push(" AND destination ILIKE ").push_bind(like_pattern(destination));
    }
    match search.date {
        Some(DateFilter::On(date)) => {
            qb.push(" AND (departure_time AT TIME ZONE 'UTC')::date = ").push_bind(date);
        }
        Some(DateFilter::Unmatchable) => {
            qb.push(" AND FALSE");
        }
        None => {}
    }
}

#[async_trait]
impl TripRepository for PostgresTripRepository {
    async fn upcoming(&self, now: DateTime<Utc>, limit: u32) -> CoreResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips \
             WHERE status = $1 AND departure_time >= $2 \
             ORDER BY departure_time ASC LIMIT $3"
        ))
        .bind(TripStatus::Open.as_str())
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        into_trips(rows)
    }

    async fn search(
        &self,
        search: &TripSearch,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> CoreResult<(Vec<Trip>, u64)> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM trips");
        push_listing_filters(&mut count_qb, search, now);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut qb = QueryBuilder::new(format!("SELECT {TRIP_COLUMNS} FROM trips"));
        push_listing_filters(&mut qb, search, now);
        qb.push(" ORDER BY departure_time ASC, id ASC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok((into_trips(rows)?, total.max(0) as u64))
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Trip::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE owner_id = $1 ORDER BY departure_time DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        into_trips(rows)
    }

    async fn insert(&self, trip: &Trip) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trips (id, owner_id, aircraft_id, origin, destination, departure_time,
                               arrival_time, available_seats, description, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(trip.id)
        .bind(trip.owner_id)
        .bind(trip.aircraft_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.departure_time)
        .bind(trip.arrival_time)
        .bind(trip.available_seats)
        .bind(&trip.description)
        .bind(trip.status.as_str())
        .bind(trip.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn update(&self, trip: &Trip) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET aircraft_id = $2, origin = $3, destination = $4, departure_time = $5,
                arrival_time = $6, available_seats = $7, description = $8, status = $9
            WHERE id = $1
            "#,
        )
        .bind(trip.id)
        .bind(trip.aircraft_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.departure_time)
        .bind(trip.arrival_time)
        .bind(trip.available_seats)
        .bind(&trip.description)
        .bind(trip.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("Trip"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        // bookings go with the trip (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
