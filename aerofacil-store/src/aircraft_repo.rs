use aerofacil_core::models::Aircraft;
use aerofacil_core::repository::AircraftRepository;
use aerofacil_core::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::storage_error;

pub struct PostgresAircraftRepository {
    pool: PgPool,
}

impl PostgresAircraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AircraftRow {
    id: Uuid,
    owner_id: Uuid,
    model_name: String,
    capacity: i32,
    created_at: DateTime<Utc>,
}

impl From<AircraftRow> for Aircraft {
    fn from(row: AircraftRow) -> Self {
        Aircraft {
            id: row.id,
            owner_id: row.owner_id,
            model_name: row.model_name,
            capacity: row.capacity,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AircraftRepository for PostgresAircraftRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Aircraft>> {
        let row = sqlx::query_as::<_, AircraftRow>(
            "SELECT id, owner_id, model_name, capacity, created_at FROM aircraft WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Aircraft::from))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> CoreResult<Vec<Aircraft>> {
        let rows = sqlx::query_as::<_, AircraftRow>(
            r#"
            SELECT id, owner_id, model_name, capacity, created_at
            FROM aircraft
            WHERE owner_id = $1
            ORDER BY model_name ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Aircraft::from).collect())
    }

    async fn insert(&self, aircraft: &Aircraft) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO aircraft (id, owner_id, model_name, capacity, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(aircraft.id)
        .bind(aircraft.owner_id)
        .bind(&aircraft.model_name)
        .bind(aircraft.capacity)
        .bind(aircraft.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}
