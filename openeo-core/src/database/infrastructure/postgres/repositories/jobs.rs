use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openeo_model::{Job, JobId, JobStatus, ProcessGraph, ProcessGraphId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;

use super::process_graphs::PostgresProcessGraphsRepository;
use super::{read_error, write_error};
use crate::database::ports::jobs::JobsRepository;
use crate::error::{CoreError, Result};

const JOB_COLUMNS: &str =
    "job_id, process_graph_id, status, user_id, created, title, description, synchronous";

#[derive(Debug, Clone)]
pub struct PostgresJobsRepository {
    pool: PgPool,
}

impl PostgresJobsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Job> {
        let job_id: JobId = row
            .try_get("job_id")
            .map_err(|e| CoreError::internal(format!("Failed to read job_id: {e}")))?;
        let process_graph_id: ProcessGraphId =
            row.try_get("process_graph_id").map_err(|e| {
                CoreError::internal(format!("Failed to read process_graph_id: {e}"))
            })?;
        let status: JobStatus = row
            .try_get("status")
            .map_err(|e| CoreError::internal(format!("Failed to read status: {e}")))?;
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| CoreError::internal(format!("Failed to read user_id: {e}")))?;
        let created: DateTime<Utc> = row
            .try_get("created")
            .map_err(|e| CoreError::internal(format!("Failed to read created: {e}")))?;
        let title: Option<String> = row
            .try_get("title")
            .map_err(|e| CoreError::internal(format!("Failed to read title: {e}")))?;
        let description: Option<String> = row
            .try_get("description")
            .map_err(|e| CoreError::internal(format!("Failed to read description: {e}")))?;
        let synchronous: bool = row
            .try_get("synchronous")
            .map_err(|e| CoreError::internal(format!("Failed to read synchronous: {e}")))?;

        Ok(Job {
            job_id,
            process_graph_id,
            status,
            user_id,
            created,
            title,
            description,
            synchronous,
        })
    }
}

#[async_trait]
impl JobsRepository for PostgresJobsRepository {
    async fn create_with_process_graph(
        &self,
        job: &Job,
        graph: &ProcessGraph,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::internal(format!("Failed to begin transaction: {e}")))?;

        PostgresProcessGraphsRepository::insert(&mut *tx, graph).await?;

        sqlx::query(
            r#"
            INSERT INTO jobs (job_id, process_graph_id, status, user_id, created, title, description, synchronous)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.job_id)
        .bind(&job.process_graph_id)
        .bind(job.status)
        .bind(job.user_id)
        .bind(job.created)
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.synchronous)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("job", e))?;

        tx.commit()
            .await
            .map_err(|e| CoreError::internal(format!("Failed to commit job: {e}")))?;

        debug!(job_id = %job.job_id, process_graph_id = %graph.process_graph_id, "job stored");
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("job", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE user_id = $1 ORDER BY created DESC, job_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("jobs", e))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: JobId,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET status = $3 WHERE job_id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("job status", e))?;

        Ok(result.rows_affected() == 1)
    }
}
