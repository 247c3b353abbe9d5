use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openeo_model::{UserDefinedProcess, UserId};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{decode_json, encode_json, read_error, write_error};
use crate::database::ports::udps::UdpsRepository;
use crate::error::{CoreError, Result};

const UDP_COLUMNS: &str = "udp_id, user_id, process_graph::text AS process_graph, created, \
     parameters::text AS parameters, returns::text AS returns, summary, description";

#[derive(Debug, Clone)]
pub struct PostgresUdpsRepository {
    pool: PgPool,
}

impl PostgresUdpsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn optional_json(row: &PgRow, column: &str) -> Result<Option<Value>> {
        let text: Option<String> = row
            .try_get(column)
            .map_err(|e| CoreError::internal(format!("Failed to read {column}: {e}")))?;
        text.map(|t| decode_json(column, &t)).transpose()
    }

    fn map_row(row: &PgRow) -> Result<UserDefinedProcess> {
        let udp_id: String = row
            .try_get("udp_id")
            .map_err(|e| CoreError::internal(format!("Failed to read udp_id: {e}")))?;
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| CoreError::internal(format!("Failed to read user_id: {e}")))?;
        let body: String = row.try_get("process_graph").map_err(|e| {
            CoreError::internal(format!("Failed to read process_graph: {e}"))
        })?;
        let created: DateTime<Utc> = row
            .try_get("created")
            .map_err(|e| CoreError::internal(format!("Failed to read created: {e}")))?;
        let summary: Option<String> = row
            .try_get("summary")
            .map_err(|e| CoreError::internal(format!("Failed to read summary: {e}")))?;
        let description: Option<String> = row
            .try_get("description")
            .map_err(|e| CoreError::internal(format!("Failed to read description: {e}")))?;

        Ok(UserDefinedProcess {
            udp_id,
            user_id,
            process_graph: decode_json("process_graph", &body)?,
            created,
            parameters: Self::optional_json(row, "parameters")?,
            returns: Self::optional_json(row, "returns")?,
            summary,
            description,
        })
    }
}

#[async_trait]
impl UdpsRepository for PostgresUdpsRepository {
    async fn create(&self, udp: &UserDefinedProcess) -> Result<()> {
        let parameters = udp.parameters.as_ref().map(encode_json).transpose()?;
        let returns = udp.returns.as_ref().map(encode_json).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO udps (udp_id, user_id, process_graph, created, parameters, returns, summary, description)
            VALUES ($1, $2, $3::json, $4, $5::json, $6::json, $7, $8)
            "#,
        )
        .bind(&udp.udp_id)
        .bind(udp.user_id)
        .bind(encode_json(&udp.process_graph)?)
        .bind(udp.created)
        .bind(parameters)
        .bind(returns)
        .bind(&udp.summary)
        .bind(&udp.description)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("user-defined process", e))?;
        Ok(())
    }

    async fn get(
        &self,
        user_id: UserId,
        udp_id: &str,
    ) -> Result<Option<UserDefinedProcess>> {
        let row = sqlx::query(&format!(
            "SELECT {UDP_COLUMNS} FROM udps WHERE user_id = $1 AND udp_id = $2"
        ))
        .bind(user_id)
        .bind(udp_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("user-defined process", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<UserDefinedProcess>> {
        let rows = sqlx::query(&format!(
            "SELECT {UDP_COLUMNS} FROM udps WHERE user_id = $1 ORDER BY udp_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("user-defined processes", e))?;

        rows.iter().map(Self::map_row).collect()
    }
}
