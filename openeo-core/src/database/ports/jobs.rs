use async_trait::async_trait;
use openeo_model::{Job, JobId, JobStatus, ProcessGraph, UserId};

use crate::error::Result;

#[async_trait]
pub trait JobsRepository: Send + Sync {
    /// Stores `graph` and `job` atomically; neither is visible without the other.
    async fn create_with_process_graph(
        &self,
        job: &Job,
        graph: &ProcessGraph,
    ) -> Result<()>;

    async fn get(&self, id: JobId) -> Result<Option<Job>>;

    /// Jobs owned by `user_id`, most recent first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Job>>;

    /// Moves the job to `next` only if its stored status is still `expected`.
    ///
    /// Returns `false` when the job is missing or its status moved on.
    async fn compare_and_set_status(
        &self,
        id: JobId,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool>;
}
