use async_trait::async_trait;
use openeo_model::{UserDefinedProcess, UserId};

use crate::error::Result;

// User-defined processes are always addressed through their owner.
#[async_trait]
pub trait UdpsRepository: Send + Sync {
    /// Fails with `Conflict` when the owner already has a UDP with this id.
    async fn create(&self, udp: &UserDefinedProcess) -> Result<()>;
    async fn get(
        &self,
        user_id: UserId,
        udp_id: &str,
    ) -> Result<Option<UserDefinedProcess>>;
    async fn list(&self, user_id: UserId) -> Result<Vec<UserDefinedProcess>>;
}
