use async_trait::async_trait;
use openeo_model::{ProcessGraph, ProcessGraphId};

use crate::error::Result;

#[async_trait]
pub trait ProcessGraphsRepository: Send + Sync {
    /// Fails with `Conflict` when the identifier is already taken.
    async fn create(&self, graph: &ProcessGraph) -> Result<()>;
    async fn get(&self, id: &ProcessGraphId) -> Result<Option<ProcessGraph>>;
}
