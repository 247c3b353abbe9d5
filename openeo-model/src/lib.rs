//! Core data model definitions shared across the openEO backend crates.
#![allow(missing_docs)]

pub mod capabilities;
pub mod catalog;
pub mod documents;
pub mod error;
pub mod ids;
pub mod job;
pub mod process_graph;
pub mod udp;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use capabilities::{
    Billing, Capabilities, ConformanceClasses, Endpoint, HttpMethod, Link,
    Plan, WellKnownDocument, WellKnownVersion,
};
pub use catalog::{Collection, Collections, Process, Processes};
pub use documents::{
    BatchJob, ErrorDocument, JobCreateRequest, JobsDocument, ProcessRequest,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{JobId, ProcessGraphId, UserId};
pub use job::{Job, JobStatus};
pub use process_graph::{ProcessGraph, validate_process_graph};
pub use udp::UserDefinedProcess;
pub use user::User;
