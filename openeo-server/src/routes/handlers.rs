//! Thin adapters from HTTP to [`OpenEoBackend`]. No business logic lives here.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use openeo_core::{CoreError, OpenEoBackend, api::routes};
use openeo_model::{
    BatchJob, Capabilities, Collection, Collections, ConformanceClasses,
    JobCreateRequest, JobId, JobsDocument, Processes, WellKnownDocument,
};

use crate::extract::{ApiJson, ApiPath, AuthenticatedUser};
use crate::infra::errors::{ApiError, ApiResult};

pub const OPENEO_IDENTIFIER: &str = "openeo-identifier";

pub async fn well_known<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
) -> Json<WellKnownDocument> {
    Json(backend.get_well_known())
}

pub async fn capabilities<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
) -> Json<Capabilities> {
    Json(backend.get_capabilities())
}

pub async fn conformance<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
) -> Json<ConformanceClasses> {
    Json(backend.get_conformance())
}

pub async fn collections<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
) -> ApiResult<Json<Collections>> {
    Ok(Json(backend.get_collections().await?))
}

pub async fn collection<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
    ApiPath(collection_id): ApiPath<String>,
) -> ApiResult<Json<Collection>> {
    Ok(Json(backend.get_collection(&collection_id).await?))
}

pub async fn processes<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
) -> ApiResult<Json<Processes>> {
    Ok(Json(backend.list_processes().await?))
}

pub async fn list_jobs<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> ApiResult<Json<JobsDocument>> {
    Ok(Json(backend.list_jobs(&user).await?))
}

pub async fn create_job<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiJson(request): ApiJson<JobCreateRequest>,
) -> ApiResult<(StatusCode, [(&'static str, String); 2])> {
    let job_id = backend.create_job(&user, request).await?;
    let location = job_location(backend.as_ref(), job_id);
    Ok((
        StatusCode::CREATED,
        [
            ("location", location),
            (OPENEO_IDENTIFIER, job_id.to_string()),
        ],
    ))
}

pub async fn get_job<B: OpenEoBackend>(
    State(backend): State<Arc<B>>,
    AuthenticatedUser(user): AuthenticatedUser,
    ApiPath(job_id): ApiPath<String>,
) -> ApiResult<Json<BatchJob>> {
    // A malformed id cannot name an existing job.
    let id = JobId::from_str(&job_id).map_err(|_| CoreError::job_not_found(&job_id))?;
    Ok(Json(backend.get_job(&user, id).await?))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("The requested URL was not found on this server.")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

fn job_location<B: OpenEoBackend>(backend: &B, job_id: JobId) -> String {
    let registry = backend.capability_registry();
    let path = routes::versioned_path(
        registry.api_version(),
        &routes::paths::JOB.replace("{job_id}", &job_id.to_string()),
    );
    match &registry.settings().public_url {
        Some(base) => format!("{}{path}", base.as_str().trim_end_matches('/')),
        None => path,
    }
}
