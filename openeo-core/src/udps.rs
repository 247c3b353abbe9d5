use std::sync::Arc;

use openeo_model::{UserDefinedProcess, UserId, validate_process_graph};
use tracing::info;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::error::{CoreError, Result};

/// User-scoped registry of named process graphs.
#[derive(Debug, Clone)]
pub struct UdpRegistry {
    uow: Arc<AppUnitOfWork>,
}

impl UdpRegistry {
    pub fn new(uow: Arc<AppUnitOfWork>) -> Self {
        Self { uow }
    }

    /// Fails with a conflict if the owner already registered `udp.udp_id`.
    pub async fn register_udp(&self, udp: UserDefinedProcess) -> Result<()> {
        if udp.udp_id.trim().is_empty() {
            return Err(CoreError::validation("Process id must not be empty."));
        }
        validate_process_graph(&udp.process_graph)?;

        self.uow.udps.create(&udp).await.map_err(|err| match err {
            CoreError::Conflict { .. } => CoreError::Conflict {
                code: "ProcessGraphIdExists",
                message: format!("A process with id '{}' already exists.", udp.udp_id),
            },
            other => other,
        })?;
        info!(udp_id = %udp.udp_id, user_id = %udp.user_id, "user-defined process registered");
        Ok(())
    }

    pub async fn get_udp(&self, owner: UserId, udp_id: &str) -> Result<UserDefinedProcess> {
        self.uow
            .udps
            .get(owner, udp_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                code: "ProcessGraphNotFound",
                message: format!("Process '{udp_id}' does not exist."),
            })
    }

    pub async fn list_udps(&self, owner: UserId) -> Result<Vec<UserDefinedProcess>> {
        self.uow.udps.list(owner).await
    }
}
