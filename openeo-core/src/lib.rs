//! # openEO Core
//!
//! Business logic of the openEO backend control plane. The HTTP layer in
//! `openeo-server` binds routes to the [`backend::OpenEoBackend`] trait; this
//! crate provides its default implementation and everything behind it.
//!
//! ## Modules
//!
//! - [`api`]: the declared core route set shared with the transport
//! - [`capabilities`]: capabilities, conformance and discovery documents
//! - [`jobs`]: batch job submission, retrieval and status transitions
//! - [`udps`]: user-defined process registry
//! - [`identity`]: bearer credential to user resolution
//! - [`catalog`]: collection and process sources (static files or STAC)
//! - [`database`]: repository ports with PostgreSQL and in-memory adapters
//!
//! ## Feature Flags
//!
//! - `database` (default): PostgreSQL adapters and [`MIGRATOR`]

#![allow(missing_docs)]

pub mod api;
pub mod application;
pub mod backend;
pub mod capabilities;
pub mod catalog;
pub mod database;
pub mod error;
pub mod identity;
pub mod jobs;
pub mod udps;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use application::unit_of_work::AppUnitOfWork;
pub use backend::{OpenEoBackend, OpenEoCore};
pub use capabilities::{ApiSettings, CapabilityError, CapabilityRegistry};
pub use error::{CoreError, Result};
pub use jobs::{JobLifecycleManager, NewJob};
pub use udps::UdpRegistry;
