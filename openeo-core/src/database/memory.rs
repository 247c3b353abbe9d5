//! In-process adapter implementing every repository port.
//!
//! All four tables sit behind one lock so multi-table writes are atomic,
//! mirroring the transaction the PostgreSQL adapter uses. Foreign keys and
//! uniqueness are enforced the same way the schema enforces them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use openeo_model::{
    Job, JobId, JobStatus, ProcessGraph, ProcessGraphId, User, UserDefinedProcess,
    UserId,
};
use tokio::sync::Mutex;

use crate::database::ports::{
    jobs::JobsRepository, process_graphs::ProcessGraphsRepository,
    udps::UdpsRepository, users::UsersRepository,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    process_graphs: HashMap<ProcessGraphId, ProcessGraph>,
    jobs: HashMap<JobId, Job>,
    udps: HashMap<(UserId, String), UserDefinedProcess>,
}

impl Tables {
    fn require_user(&self, user_id: UserId, what: &str) -> Result<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(CoreError::validation(format!(
                "{what} references a record that does not exist"
            )))
        }
    }

    fn insert_process_graph(&mut self, graph: &ProcessGraph) -> Result<()> {
        self.require_user(graph.user_id, "process graph")?;
        if self.process_graphs.contains_key(&graph.process_graph_id) {
            return Err(CoreError::conflict("process graph already exists"));
        }
        self.process_graphs
            .insert(graph.process_graph_id.clone(), graph.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for InMemoryStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn get_by_subject(&self, oidc_sub: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.oidc_sub == oidc_sub)
            .cloned())
    }

    async fn ensure_user(&self, oidc_sub: &str) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) =
            tables.users.values().find(|user| user.oidc_sub == oidc_sub)
        {
            return Ok(existing.clone());
        }
        let user = User::new(oidc_sub);
        tables.users.insert(user.user_id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl JobsRepository for InMemoryStore {
    async fn create_with_process_graph(
        &self,
        job: &Job,
        graph: &ProcessGraph,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        // Check everything first so a failure leaves no partial write.
        tables.require_user(graph.user_id, "process graph")?;
        tables.require_user(job.user_id, "job")?;
        if tables.process_graphs.contains_key(&graph.process_graph_id) {
            return Err(CoreError::conflict("process graph already exists"));
        }
        if job.process_graph_id != graph.process_graph_id {
            return Err(CoreError::validation(
                "job references a record that does not exist",
            ));
        }
        if tables.jobs.contains_key(&job.job_id) {
            return Err(CoreError::conflict("job already exists"));
        }

        tables.insert_process_graph(graph)?;
        tables.jobs.insert(job.job_id, job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>> {
        Ok(self.tables.lock().await.jobs.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Job>> {
        let tables = self.tables.lock().await;
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| job.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            b.created.cmp(&a.created).then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(jobs)
    }

    async fn compare_and_set_status(
        &self,
        id: JobId,
        expected: JobStatus,
        next: JobStatus,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.jobs.get_mut(&id) {
            Some(job) if job.status == expected => {
                job.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ProcessGraphsRepository for InMemoryStore {
    async fn create(&self, graph: &ProcessGraph) -> Result<()> {
        self.tables.lock().await.insert_process_graph(graph)
    }

    async fn get(&self, id: &ProcessGraphId) -> Result<Option<ProcessGraph>> {
        Ok(self.tables.lock().await.process_graphs.get(id).cloned())
    }
}

#[async_trait]
impl UdpsRepository for InMemoryStore {
    async fn create(&self, udp: &UserDefinedProcess) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.require_user(udp.user_id, "user-defined process")?;
        let key = (udp.user_id, udp.udp_id.clone());
        if tables.udps.contains_key(&key) {
            return Err(CoreError::conflict("user-defined process already exists"));
        }
        tables.udps.insert(key, udp.clone());
        Ok(())
    }

    async fn get(
        &self,
        user_id: UserId,
        udp_id: &str,
    ) -> Result<Option<UserDefinedProcess>> {
        let tables = self.tables.lock().await;
        Ok(tables.udps.get(&(user_id, udp_id.to_string())).cloned())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<UserDefinedProcess>> {
        let tables = self.tables.lock().await;
        let mut udps: Vec<UserDefinedProcess> = tables
            .udps
            .values()
            .filter(|udp| udp.user_id == user_id)
            .cloned()
            .collect();
        udps.sort_by(|a, b| a.udp_id.cmp(&b.udp_id));
        Ok(udps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph_for(user: &User) -> ProcessGraph {
        ProcessGraph::new(
            ProcessGraphId::generate(),
            user.user_id,
            json!({"load": {"process_id": "load_collection", "arguments": {}}}),
        )
    }

    #[tokio::test]
    async fn ensure_user_is_idempotent() {
        let store = InMemoryStore::new();
        let first = store.ensure_user("sub-1").await.unwrap();
        let second = store.ensure_user("sub-1").await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(
            store.get_by_subject("sub-1").await.unwrap().map(|u| u.user_id),
            Some(first.user_id)
        );
    }

    #[tokio::test]
    async fn job_requires_existing_user() {
        let store = InMemoryStore::new();
        let ghost = User::new("ghost");
        let graph = graph_for(&ghost);
        let job = Job::new(ghost.user_id, graph.process_graph_id.clone(), None, None, false);

        let err = store.create_with_process_graph(&job, &graph).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(
            ProcessGraphsRepository::get(&store, &graph.process_graph_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_process_graph_id_conflicts() {
        let store = InMemoryStore::new();
        let user = store.ensure_user("sub").await.unwrap();
        let graph = graph_for(&user);
        ProcessGraphsRepository::create(&store, &graph).await.unwrap();

        let err = ProcessGraphsRepository::create(&store, &graph)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn compare_and_set_only_applies_once() {
        let store = InMemoryStore::new();
        let user = store.ensure_user("sub").await.unwrap();
        let graph = graph_for(&user);
        let job = Job::new(user.user_id, graph.process_graph_id.clone(), None, None, false);
        store.create_with_process_graph(&job, &graph).await.unwrap();

        assert!(
            store
                .compare_and_set_status(job.job_id, JobStatus::Created, JobStatus::Queued)
                .await
                .unwrap()
        );
        assert!(
            !store
                .compare_and_set_status(job.job_id, JobStatus::Created, JobStatus::Canceled)
                .await
                .unwrap()
        );
        let stored = JobsRepository::get(&store, job.job_id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn udps_are_scoped_per_user() {
        let store = InMemoryStore::new();
        let alice = store.ensure_user("alice").await.unwrap();
        let bob = store.ensure_user("bob").await.unwrap();
        let body = json!({"a": {"process_id": "add", "arguments": {"x": 1, "y": 2}}});

        UdpsRepository::create(&store, &UserDefinedProcess::new("ndvi", alice.user_id, body.clone()))
            .await
            .unwrap();
        UdpsRepository::create(&store, &UserDefinedProcess::new("ndvi", bob.user_id, body.clone()))
            .await
            .unwrap();

        let err = UdpsRepository::create(
            &store,
            &UserDefinedProcess::new("ndvi", alice.user_id, body),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
        assert_eq!(UdpsRepository::list(&store, alice.user_id).await.unwrap().len(), 1);
    }
}
