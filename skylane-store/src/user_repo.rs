use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use skylane_core::identity::{hash_secret, verify_secret, CredentialStore, IdentityError};
use skylane_core::user::User;

use crate::database::is_unique_violation;

pub struct PostgresDirectory {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
        }
    }
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// First-startup seeding: create the configured administrator account
    /// when no admin exists yet.
    pub async fn seed_admin(&self, username: &str, secret: &str) -> Result<(), IdentityError> {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE is_admin = TRUE LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| IdentityError::Storage(e.to_string()))?;

        if existing.is_some() {
            return Ok(());
        }

        match self.register(username, secret, true).await {
            Ok(user) => {
                info!("seeded administrator account '{}'", user.username);
                Ok(())
            }
            // Another instance won the race; the account exists either way.
            Err(IdentityError::DuplicateUser(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl CredentialStore for PostgresDirectory {
    async fn register(&self, username: &str, secret: &str, is_admin: bool)
        -> Result<User, IdentityError>
    {
        let password_hash = hash_secret(secret)?;

        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, username, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, password_hash, is_admin",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(&password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                IdentityError::DuplicateUser(username.to_string())
            } else {
                IdentityError::Storage(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn authenticate(&self, username: &str, secret: &str)
        -> Result<User, IdentityError>
    {
        let user = self.find_by_username(username).await?;
        user.filter(|u| verify_secret(secret, &u.password_hash))
            .ok_or(IdentityError::InvalidCredentials)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::Storage(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::Storage(e.to_string()))?;

        Ok(row.map(User::from))
    }
}
