use aerofacil_core::models::{NewUser, User};
use aerofacil_core::repository::UserRepository;
use aerofacil_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{is_unique_violation, storage_error};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    full_name: Option<String>,
    phone_number: Option<String>,
    is_owner: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            phone_number: row.phone_number,
            is_owner: row.is_owner,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, full_name, phone_number, is_owner, password_hash, created_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> CoreResult<User> {
        let user = user.into_user();
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, full_name, phone_number, is_owner, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(user.is_owner)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(CoreError::Conflict(format!("username {} is already taken", user.username)))
            }
            Err(e) => Err(storage_error(e)),
        }
    }
}
