use std::sync::Arc;
use std::time::Duration;

use openeo_core::{
    AppUnitOfWork, CoreError, JobLifecycleManager, NewJob, UdpRegistry,
};
use openeo_model::{JobId, JobStatus, User, UserDefinedProcess, UserId};
use serde_json::{Value, json};

fn ndvi_graph() -> Value {
    json!({
        "loadco1": {
            "process_id": "load_collection",
            "arguments": {"id": "SENTINEL2_L2A", "spatial_extent": null}
        },
        "ndvi1": {
            "process_id": "ndvi",
            "arguments": {"data": {"from_node": "loadco1"}},
            "result": true
        }
    })
}

struct Harness {
    uow: Arc<AppUnitOfWork>,
    jobs: JobLifecycleManager,
}

impl Harness {
    fn new() -> Self {
        let uow = Arc::new(AppUnitOfWork::in_memory());
        Self {
            jobs: JobLifecycleManager::new(Arc::clone(&uow)),
            uow,
        }
    }

    async fn user(&self, sub: &str) -> User {
        self.uow.users.ensure_user(sub).await.unwrap()
    }

    async fn submit(&self, owner: &User, title: &str) -> JobId {
        self.jobs
            .create_job(
                owner.user_id,
                NewJob {
                    process_graph: Some(ndvi_graph()),
                    title: Some(title.into()),
                    description: Some("Deriving minimum NDVI measurements".into()),
                    synchronous: false,
                },
            )
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn created_job_is_visible_to_owner() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let job_id = h.submit(&owner, "NDVI based on Sentinel 2").await;

    let job = h.jobs.get_job(job_id, owner.user_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Created);
    assert_eq!(job.title.as_deref(), Some("NDVI based on Sentinel 2"));
    assert_eq!(
        job.description.as_deref(),
        Some("Deriving minimum NDVI measurements")
    );

    let graph = h.jobs.process_graph_for(&job).await.unwrap();
    assert_eq!(graph.process_graph, ndvi_graph());
    assert_eq!(graph.user_id, owner.user_id);
}

#[tokio::test]
async fn every_job_gets_its_own_process_graph() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let first = h.jobs.get_job(h.submit(&owner, "a").await, owner.user_id).await.unwrap();
    let second = h.jobs.get_job(h.submit(&owner, "b").await, owner.user_id).await.unwrap();
    assert_ne!(first.process_graph_id, second.process_graph_id);
}

#[tokio::test]
async fn other_users_are_forbidden() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let intruder = h.user("intruder").await;
    let job_id = h.submit(&owner, "private").await;

    let err = h.jobs.get_job(job_id, intruder.user_id).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
    assert_eq!(err.code(), "PermissionsInsufficient");
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let err = h.jobs.get_job(JobId::new(), owner.user_id).await.unwrap_err();
    assert_eq!(err.code(), "JobNotFound");
}

#[tokio::test]
async fn missing_process_graph_is_rejected() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let err = h
        .jobs
        .create_job(owner.user_id, NewJob::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ProcessGraphMissing");
    assert!(h.jobs.list_jobs(owner.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_process_graphs_are_rejected() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let bad_graphs = [
        json!([]),
        json!({}),
        json!({"n": {"arguments": {}}}),
        json!({"n": {"process_id": "add", "arguments": []}}),
    ];
    for graph in bad_graphs {
        let err = h
            .jobs
            .create_job(
                owner.user_id,
                NewJob {
                    process_graph: Some(graph.clone()),
                    ..NewJob::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }), "{graph}");
    }
}

#[tokio::test]
async fn unknown_owner_is_a_validation_error() {
    let h = Harness::new();
    let err = h
        .jobs
        .create_job(
            UserId::new(),
            NewJob {
                process_graph: Some(ndvi_graph()),
                ..NewJob::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

#[tokio::test]
async fn list_is_empty_for_new_user_and_scoped_to_owner() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    assert!(h.jobs.list_jobs(alice.user_id).await.unwrap().is_empty());

    let first = h.submit(&alice, "first").await;
    // Distinct creation timestamps.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = h.submit(&alice, "second").await;
    h.submit(&bob, "bob's").await;

    let listed: Vec<JobId> = h
        .jobs
        .list_jobs(alice.user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|job| job.job_id)
        .collect();
    assert_eq!(listed, vec![second, first]);
}

#[tokio::test]
async fn skipping_to_finished_conflicts_and_keeps_status() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let job_id = h.submit(&owner, "skip").await;

    let err = h
        .jobs
        .transition(job_id, owner.user_id, JobStatus::Finished)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));
    assert_eq!(
        h.jobs.get_job(job_id, owner.user_id).await.unwrap().status,
        JobStatus::Created
    );
}

#[tokio::test]
async fn canceling_a_created_job_conflicts_and_keeps_status() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let job_id = h.submit(&owner, "not yet queued").await;

    let err = h
        .jobs
        .transition(job_id, owner.user_id, JobStatus::Canceled)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "JobStatusConflict");
    assert_eq!(
        h.jobs.get_job(job_id, owner.user_id).await.unwrap().status,
        JobStatus::Created
    );

    h.jobs
        .transition(job_id, owner.user_id, JobStatus::Queued)
        .await
        .unwrap();
    let job = h
        .jobs
        .transition(job_id, owner.user_id, JobStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
}

#[tokio::test]
async fn full_lifecycle_then_terminal() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let job_id = h.submit(&owner, "run").await;

    for next in [JobStatus::Queued, JobStatus::Running, JobStatus::Finished] {
        let job = h.jobs.transition(job_id, owner.user_id, next).await.unwrap();
        assert_eq!(job.status, next);
    }

    let err = h
        .jobs
        .transition(job_id, owner.user_id, JobStatus::Canceled)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "JobStatusConflict");
}

#[tokio::test]
async fn non_owner_cannot_transition() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let intruder = h.user("intruder").await;
    let job_id = h.submit(&owner, "guarded").await;

    let err = h
        .jobs
        .transition(job_id, intruder.user_id, JobStatus::Canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
}

#[tokio::test]
async fn concurrent_conflicting_transitions_have_one_winner() {
    let h = Harness::new();
    let owner = h.user("owner").await;
    let job_id = h.submit(&owner, "race").await;
    for next in [JobStatus::Queued, JobStatus::Running] {
        h.jobs.transition(job_id, owner.user_id, next).await.unwrap();
    }

    let (finished, failed) = tokio::join!(
        h.jobs.transition(job_id, owner.user_id, JobStatus::Finished),
        h.jobs.transition(job_id, owner.user_id, JobStatus::Error),
    );
    assert_eq!(
        [finished.is_ok(), failed.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count(),
        1
    );

    let stored = h.jobs.get_job(job_id, owner.user_id).await.unwrap().status;
    assert!(matches!(stored, JobStatus::Finished | JobStatus::Error));
}

#[tokio::test]
async fn udp_registry_rejects_duplicates_per_owner() {
    let h = Harness::new();
    let registry = UdpRegistry::new(Arc::clone(&h.uow));
    let owner = h.user("owner").await;

    let mut udp = UserDefinedProcess::new("evi", owner.user_id, ndvi_graph());
    udp.summary = Some("Enhanced vegetation index".into());
    registry.register_udp(udp.clone()).await.unwrap();

    let err = registry.register_udp(udp).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));

    let fetched = registry.get_udp(owner.user_id, "evi").await.unwrap();
    assert_eq!(fetched.summary.as_deref(), Some("Enhanced vegetation index"));
    assert_eq!(registry.list_udps(owner.user_id).await.unwrap().len(), 1);

    let other = h.user("other").await;
    let err = registry.get_udp(other.user_id, "evi").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}
