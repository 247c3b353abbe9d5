//! Repository tests against a real PostgreSQL instance.
//!
//! Run with `DATABASE_URL` set and `--ignored`.

#![cfg(feature = "database")]

use openeo_core::database::PostgresDatabase;
use openeo_core::database::ports::{
    jobs::JobsRepository, process_graphs::ProcessGraphsRepository,
    udps::UdpsRepository, users::UsersRepository,
};
use openeo_core::CoreError;
use openeo_model::{
    Job, JobStatus, ProcessGraph, ProcessGraphId, User, UserDefinedProcess,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrator = "openeo_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn ensure_user_is_idempotent(pool: PgPool) {
    let users = PostgresDatabase::from_pool(pool).users_repository();

    let first = users.ensure_user("sub-1").await.unwrap();
    let second = users.ensure_user("sub-1").await.unwrap();
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(
        users.get_by_id(first.user_id).await.unwrap().map(|u| u.oidc_sub),
        Some("sub-1".to_string())
    );
}

#[sqlx::test(migrator = "openeo_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn process_graph_keeps_key_order(pool: PgPool) {
    let db = PostgresDatabase::from_pool(pool);
    let user = db.users_repository().ensure_user("sub").await.unwrap();
    let body = json!({
        "zeta": {"process_id": "load_collection", "arguments": {"id": "S2", "bands": ["B8", "B4"]}},
        "alpha": {"process_id": "ndvi", "arguments": {"data": {"from_node": "zeta"}}, "result": true}
    });
    let graph = ProcessGraph::new(ProcessGraphId::generate(), user.user_id, body.clone());

    let repo = db.process_graphs_repository();
    repo.create(&graph).await.unwrap();
    let stored = repo.get(&graph.process_graph_id).await.unwrap().unwrap();

    assert_eq!(
        serde_json::to_string(&stored.process_graph).unwrap(),
        serde_json::to_string(&body).unwrap()
    );

    let err = repo.create(&graph).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));
}

#[sqlx::test(migrator = "openeo_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn job_insert_rolls_back_with_dangling_user(pool: PgPool) {
    let db = PostgresDatabase::from_pool(pool);
    let ghost = User::new("ghost");
    let graph = ProcessGraph::new(
        ProcessGraphId::generate(),
        ghost.user_id,
        json!({"a": {"process_id": "add", "arguments": {}}}),
    );
    let job = Job::new(ghost.user_id, graph.process_graph_id.clone(), None, None, false);

    let err = db
        .jobs_repository()
        .create_with_process_graph(&job, &graph)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(
        db.process_graphs_repository()
            .get(&graph.process_graph_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrator = "openeo_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn status_compare_and_set(pool: PgPool) {
    let db = PostgresDatabase::from_pool(pool);
    let user = db.users_repository().ensure_user("sub").await.unwrap();
    let graph = ProcessGraph::new(
        ProcessGraphId::generate(),
        user.user_id,
        json!({"a": {"process_id": "add", "arguments": {}}}),
    );
    let job = Job::new(
        user.user_id,
        graph.process_graph_id.clone(),
        Some("title".into()),
        None,
        true,
    );
    let jobs = db.jobs_repository();
    jobs.create_with_process_graph(&job, &graph).await.unwrap();

    assert!(
        jobs.compare_and_set_status(job.job_id, JobStatus::Created, JobStatus::Queued)
            .await
            .unwrap()
    );
    assert!(
        !jobs
            .compare_and_set_status(job.job_id, JobStatus::Created, JobStatus::Canceled)
            .await
            .unwrap()
    );

    let stored = jobs.get(job.job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Queued);
    assert!(stored.synchronous);
    assert_eq!(jobs.list_for_user(user.user_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrator = "openeo_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn udp_uniqueness_is_per_user(pool: PgPool) {
    let db = PostgresDatabase::from_pool(pool);
    let users = db.users_repository();
    let alice = users.ensure_user("alice").await.unwrap();
    let bob = users.ensure_user("bob").await.unwrap();
    let body = json!({"a": {"process_id": "add", "arguments": {"x": 1, "y": 2}}});

    let udps = db.udps_repository();
    let mut udp = UserDefinedProcess::new("evi", alice.user_id, body.clone());
    udp.parameters = Some(json!([{"name": "data", "schema": {"type": "object"}}]));
    udps.create(&udp).await.unwrap();
    udps.create(&UserDefinedProcess::new("evi", bob.user_id, body))
        .await
        .unwrap();

    let err = udps.create(&udp).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));

    let stored = udps.get(alice.user_id, "evi").await.unwrap().unwrap();
    assert_eq!(stored.parameters, udp.parameters);
}
