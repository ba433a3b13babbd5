use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use aerofacil_core::{CoreError, Repositories};

use crate::aircraft_repo::PostgresAircraftRepository;
use crate::booking_repo::PostgresBookingRepository;
use crate::trip_repo::PostgresTripRepository;
use crate::user_repo::PostgresUserRepository;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            trips: Arc::new(PostgresTripRepository::new(self.pool.clone())),
            bookings: Arc::new(PostgresBookingRepository::new(self.pool.clone())),
            aircraft: Arc::new(PostgresAircraftRepository::new(self.pool.clone())),
            users: Arc::new(PostgresUserRepository::new(self.pool.clone())),
        }
    }
}

/// Maps driver failures into the domain error, keeping the cause for logs.
pub(crate) fn storage_error(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
