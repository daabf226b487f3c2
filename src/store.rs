//! Credential Store
//!
//! The user records live in an external Postgres database owned by the
//! wider application; this service only reads them. The [`UserStore`]
//! trait is the seam between the auth flow and that collaborator.

use crate::models::User;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Credential store failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("credential store unreachable: {0}")]
    Unavailable(String),

    #[error("credential store error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
            _ => {
                tracing::error!("Credential store error: {:?}", err);
                StoreError::Internal(err.to_string())
            }
        }
    }
}

/// Read access to user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Postgres-backed credential store
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Create the role enum and users table if they do not exist
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        tracing::info!("Running credential store migrations");

        sqlx::query(
            r#"
            DO $$ BEGIN
                CREATE TYPE role AS ENUM ('user', 'editor', 'admin');
            EXCEPTION
                WHEN duplicate_object THEN null;
            END $$;
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                username VARCHAR(100) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                roles role[] NOT NULL DEFAULT '{user}',
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);")
            .execute(&self.db)
            .await?;

        tracing::info!("Credential store migrations completed");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

// ============================================
// Test Support
// ============================================
