//! The backend contract the HTTP layer dispatches into.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use openeo_model::{
    BatchJob, Capabilities, Collection, Collections, ConformanceClasses,
    JobCreateRequest, JobId, JobsDocument, Processes, User, WellKnownDocument,
};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::capabilities::CapabilityRegistry;
use crate::catalog::{CollectionCatalog, ProcessCatalog};
use crate::error::Result;
use crate::identity::{Authenticator, IdentityProvider};
use crate::jobs::{JobLifecycleManager, NewJob};
use crate::udps::UdpRegistry;

/// One handler per core endpoint. Transport code owns no business logic and
/// only calls through this trait.
#[async_trait]
pub trait OpenEoBackend: Send + Sync + 'static {
    fn capability_registry(&self) -> &CapabilityRegistry;

    async fn authenticate(&self, authorization: Option<&str>) -> Result<User>;

    fn get_well_known(&self) -> WellKnownDocument {
        self.capability_registry().well_known()
    }

    fn get_capabilities(&self) -> Capabilities {
        self.capability_registry().describe_backend()
    }

    fn get_conformance(&self) -> ConformanceClasses {
        self.capability_registry().list_conformance()
    }

    async fn get_collections(&self) -> Result<Collections>;
    async fn get_collection(&self, collection_id: &str) -> Result<Collection>;
    async fn list_processes(&self) -> Result<Processes>;

    async fn list_jobs(&self, user: &User) -> Result<JobsDocument>;
    async fn create_job(&self, user: &User, request: JobCreateRequest) -> Result<JobId>;
    async fn get_job(&self, user: &User, job_id: JobId) -> Result<BatchJob>;
}

/// Default [`OpenEoBackend`] assembled from the core services.
#[derive(Clone)]
pub struct OpenEoCore {
    registry: Arc<CapabilityRegistry>,
    authenticator: Authenticator,
    collections: Arc<dyn CollectionCatalog>,
    processes: Arc<dyn ProcessCatalog>,
    jobs: JobLifecycleManager,
    udps: UdpRegistry,
}

impl fmt::Debug for OpenEoCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenEoCore")
            .field("api_version", &self.registry.api_version())
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl OpenEoCore {
    pub fn new(
        registry: CapabilityRegistry,
        uow: AppUnitOfWork,
        identity: Arc<dyn IdentityProvider>,
        collections: Arc<dyn CollectionCatalog>,
        processes: Arc<dyn ProcessCatalog>,
    ) -> Self {
        let uow = Arc::new(uow);
        Self {
            registry: Arc::new(registry),
            authenticator: Authenticator::new(identity, Arc::clone(&uow.users)),
            collections,
            processes,
            jobs: JobLifecycleManager::new(Arc::clone(&uow)),
            udps: UdpRegistry::new(uow),
        }
    }

    pub fn jobs(&self) -> &JobLifecycleManager {
        &self.jobs
    }

    pub fn udps(&self) -> &UdpRegistry {
        &self.udps
    }
}

#[async_trait]
impl OpenEoBackend for OpenEoCore {
    fn capability_registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<User> {
        self.authenticator.authenticate(authorization).await
    }

    async fn get_collections(&self) -> Result<Collections> {
        self.collections.list_collections().await
    }

    async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        self.collections.get_collection(collection_id).await
    }

    async fn list_processes(&self) -> Result<Processes> {
        self.processes.list_processes().await
    }

    async fn list_jobs(&self, user: &User) -> Result<JobsDocument> {
        let jobs = self.jobs.list_jobs(user.user_id).await?;
        Ok(JobsDocument {
            jobs: jobs.iter().map(BatchJob::summary).collect(),
            links: Vec::new(),
        })
    }

    async fn create_job(&self, user: &User, request: JobCreateRequest) -> Result<JobId> {
        let process_graph = request.process_graph().cloned();
        self.jobs
            .create_job(
                user.user_id,
                NewJob {
                    process_graph,
                    title: request.title,
                    description: request.description,
                    synchronous: request.synchronous,
                },
            )
            .await
    }

    async fn get_job(&self, user: &User, job_id: JobId) -> Result<BatchJob> {
        let job = self.jobs.get_job(job_id, user.user_id).await?;
        let graph = self.jobs.process_graph_for(&job).await?;
        Ok(BatchJob::with_process_graph(&job, &graph))
    }
}
