//! Batch job lifecycle: submission, retrieval and status transitions.

use std::fmt;
use std::sync::Arc;

use openeo_model::{
    Job, JobId, JobStatus, ProcessGraph, ProcessGraphId, UserId,
    validate_process_graph,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::error::{CoreError, Result};

/// Everything needed to submit a job besides the owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewJob {
    pub process_graph: Option<Value>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub synchronous: bool,
}

#[derive(Clone)]
pub struct JobLifecycleManager {
    uow: Arc<AppUnitOfWork>,
}

impl fmt::Debug for JobLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLifecycleManager")
            .field("uow", &self.uow)
            .finish()
    }
}

impl JobLifecycleManager {
    pub fn new(uow: Arc<AppUnitOfWork>) -> Self {
        Self { uow }
    }

    /// Validates the graph, then stores a fresh process graph record and a
    /// `created` job pointing at it in one step.
    pub async fn create_job(&self, owner: UserId, request: NewJob) -> Result<JobId> {
        let body = request
            .process_graph
            .ok_or_else(CoreError::process_graph_missing)?;
        validate_process_graph(&body)?;

        if self.uow.users.get_by_id(owner).await?.is_none() {
            return Err(CoreError::validation(format!(
                "User '{owner}' does not exist."
            )));
        }

        let graph = ProcessGraph::new(ProcessGraphId::generate(), owner, body);
        let job = Job::new(
            owner,
            graph.process_graph_id.clone(),
            request.title,
            request.description,
            request.synchronous,
        );

        self.uow.jobs.create_with_process_graph(&job, &graph).await?;
        info!(job_id = %job.job_id, user_id = %owner, "batch job created");
        Ok(job.job_id)
    }

    pub async fn get_job(&self, job_id: JobId, requester: UserId) -> Result<Job> {
        let job = self
            .uow
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| CoreError::job_not_found(job_id))?;

        if !job.is_owned_by(requester) {
            warn!(%job_id, user_id = %requester, "job access denied");
            return Err(CoreError::forbidden(format!(
                "You are not allowed to access batch job '{job_id}'."
            )));
        }
        Ok(job)
    }

    /// The requester's jobs, most recent first.
    pub async fn list_jobs(&self, requester: UserId) -> Result<Vec<Job>> {
        self.uow.jobs.list_for_user(requester).await
    }

    /// Moves a job one step along its state machine.
    ///
    /// The stored update only applies if nobody else changed the status in
    /// between; losing that race is reported as a conflict.
    pub async fn transition(
        &self,
        job_id: JobId,
        requester: UserId,
        next: JobStatus,
    ) -> Result<Job> {
        let mut job = self.get_job(job_id, requester).await?;
        let current = job.status;
        current.transition(next)?;

        let applied = self
            .uow
            .jobs
            .compare_and_set_status(job_id, current, next)
            .await?;
        if !applied {
            let now = self
                .uow
                .jobs
                .get(job_id)
                .await?
                .map(|stored| stored.status);
            warn!(%job_id, from = %current, to = %next, ?now, "concurrent status change");
            return Err(CoreError::Conflict {
                code: "JobStatusConflict",
                message: format!(
                    "Batch job '{job_id}' changed status concurrently; \
                     cannot move from {current} to {next}."
                ),
            });
        }

        info!(%job_id, from = %current, to = %next, "job status changed");
        job.status = next;
        Ok(job)
    }

    pub async fn process_graph_for(&self, job: &Job) -> Result<ProcessGraph> {
        self.uow
            .process_graphs
            .get(&job.process_graph_id)
            .await?
            .ok_or_else(|| {
                CoreError::internal(format!(
                    "Process graph '{}' for job '{}' is missing",
                    job.process_graph_id, job.job_id
                ))
            })
    }
}
