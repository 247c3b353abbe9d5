use std::{fmt, time::Duration};

use serde::Deserialize;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::info;

use crate::database::infrastructure::postgres::{
    PostgresJobsRepository, PostgresProcessGraphsRepository,
    PostgresUdpsRepository, PostgresUsersRepository,
};
use crate::error::{CoreError, Result};

/// Connection pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.settings.max_connections)
            .field("min_connections", &self.settings.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(connection_string: &str, settings: PoolSettings) -> Result<Self> {
        let options = connection_string
            .trim()
            .parse::<PgConnectOptions>()
            .map_err(|e| {
                CoreError::internal(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| CoreError::internal(format!("Database connection failed: {e}")))?;

        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "database pool initialized"
        );

        Ok(Self { pool, settings })
    }

    /// Wraps an existing pool, e.g. one handed out by `#[sqlx::test]`.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            settings: PoolSettings::default(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn users_repository(&self) -> PostgresUsersRepository {
        PostgresUsersRepository::new(self.pool.clone())
    }

    pub fn jobs_repository(&self) -> PostgresJobsRepository {
        PostgresJobsRepository::new(self.pool.clone())
    }

    pub fn process_graphs_repository(&self) -> PostgresProcessGraphsRepository {
        PostgresProcessGraphsRepository::new(self.pool.clone())
    }

    pub fn udps_repository(&self) -> PostgresUdpsRepository {
        PostgresUdpsRepository::new(self.pool.clone())
    }
}
