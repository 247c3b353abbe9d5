use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openeo_model::{User, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;

use super::{read_error, write_error};
use crate::database::ports::users::UsersRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<User> {
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| CoreError::internal(format!("Failed to read user_id: {e}")))?;
        let oidc_sub: String = row
            .try_get("oidc_sub")
            .map_err(|e| CoreError::internal(format!("Failed to read oidc_sub: {e}")))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| CoreError::internal(format!("Failed to read created_at: {e}")))?;

        Ok(User {
            user_id,
            oidc_sub,
            created_at,
        })
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT user_id, oidc_sub, created_at FROM users WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("user", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_by_subject(&self, oidc_sub: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT user_id, oidc_sub, created_at FROM users WHERE oidc_sub = $1",
        )
        .bind(oidc_sub)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("user", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn ensure_user(&self, oidc_sub: &str) -> Result<User> {
        let candidate = User::new(oidc_sub);
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, oidc_sub, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (oidc_sub) DO NOTHING
            "#,
        )
        .bind(candidate.user_id)
        .bind(&candidate.oidc_sub)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("user", e))?
        .rows_affected();

        if inserted == 1 {
            debug!(user_id = %candidate.user_id, "registered new user");
            return Ok(candidate);
        }

        self.get_by_subject(oidc_sub).await?.ok_or_else(|| {
            CoreError::internal(format!("User for subject '{oidc_sub}' vanished"))
        })
    }
}
