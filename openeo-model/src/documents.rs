//! Request and response payloads exchanged over the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    capabilities::Link,
    ids::JobId,
    job::{Job, JobStatus},
    process_graph::ProcessGraph,
};

/// Process wrapper as submitted with a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_graph: Option<Value>,
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub synchronous: bool,
}

impl JobCreateRequest {
    pub fn process_graph(&self) -> Option<&Value> {
        self.process.as_ref()?.process_graph.as_ref()
    }
}

/// Job metadata as returned by `GET /jobs` and `GET /jobs/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessRequest>,
    pub status: JobStatus,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub synchronous: bool,
}

impl BatchJob {
    /// Summary form used in listings; the process graph is left out.
    pub fn summary(job: &Job) -> Self {
        Self {
            id: job.job_id,
            title: job.title.clone(),
            description: job.description.clone(),
            process: None,
            status: job.status,
            created: job.created,
            synchronous: job.synchronous,
        }
    }

    pub fn with_process_graph(job: &Job, graph: &ProcessGraph) -> Self {
        Self {
            process: Some(ProcessRequest {
                id: Some(graph.process_graph_id.to_string()),
                process_graph: Some(graph.process_graph.clone()),
                ..ProcessRequest::default()
            }),
            ..Self::summary(job)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsDocument {
    pub jobs: Vec<BatchJob>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Standard error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}
