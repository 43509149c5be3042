//! Repository for the `users` table.

use piata_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for users queries.
const COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, created_at, updated_at";

/// Provides lookups and idempotent creation for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their unique username.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new user. Fails with a `uq_users_username` violation when
    /// the username is taken.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(pool)
            .await
    }

    /// Insert the user unless the username already exists.
    ///
    /// Existing rows are left untouched. Returns the row and whether it was
    /// created by this call.
    pub async fn upsert_by_username(
        pool: &PgPool,
        input: &CreateUser,
    ) -> Result<(User, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, ''))
             ON CONFLICT ON CONSTRAINT uq_users_username DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(user) => Ok((user, true)),
            None => {
                let existing = Self::find_by_username(pool, &input.username)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, false))
            }
        }
    }
}
