use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openeo_model::{ProcessGraph, ProcessGraphId, UserId};
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};

use super::{decode_json, encode_json, read_error, write_error};
use crate::database::ports::process_graphs::ProcessGraphsRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresProcessGraphsRepository {
    pool: PgPool,
}

impl PostgresProcessGraphsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn map_row(row: &PgRow) -> Result<ProcessGraph> {
        let process_graph_id: ProcessGraphId =
            row.try_get("process_graph_id").map_err(|e| {
                CoreError::internal(format!("Failed to read process_graph_id: {e}"))
            })?;
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| CoreError::internal(format!("Failed to read user_id: {e}")))?;
        let body: String = row.try_get("process_graph").map_err(|e| {
            CoreError::internal(format!("Failed to read process_graph: {e}"))
        })?;
        let created: DateTime<Utc> = row
            .try_get("created")
            .map_err(|e| CoreError::internal(format!("Failed to read created: {e}")))?;

        Ok(ProcessGraph {
            process_graph_id,
            process_graph: decode_json("process_graph", &body)?,
            user_id,
            created,
        })
    }

    /// Insert usable both on the pool and inside a caller's transaction.
    pub(crate) async fn insert<'e, E>(executor: E, graph: &ProcessGraph) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO process_graphs (process_graph_id, user_id, process_graph, created)
            VALUES ($1, $2, $3::json, $4)
            "#,
        )
        .bind(&graph.process_graph_id)
        .bind(graph.user_id)
        .bind(encode_json(&graph.process_graph)?)
        .bind(graph.created)
        .execute(executor)
        .await
        .map_err(|e| write_error("process graph", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProcessGraphsRepository for PostgresProcessGraphsRepository {
    async fn create(&self, graph: &ProcessGraph) -> Result<()> {
        Self::insert(&self.pool, graph).await
    }

    async fn get(&self, id: &ProcessGraphId) -> Result<Option<ProcessGraph>> {
        let row = sqlx::query(
            r#"
            SELECT process_graph_id, user_id, process_graph::text AS process_graph, created
            FROM process_graphs
            WHERE process_graph_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("process graph", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
