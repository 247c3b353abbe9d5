//! Repository ports (interfaces) for the four persisted entities.
//!
//! Adapters live under `database::infrastructure` (PostgreSQL) and
//! `database::memory` (in-process, used by tests and database-less runs).

pub mod jobs;
pub mod process_graphs;
pub mod udps;
pub mod users;
