//! # openEO Server
//!
//! Axum transport for the openEO API. The route table is built once by
//! [`routes::RouteDispatcher`] and every handler delegates to an
//! [`openeo_core::OpenEoBackend`]; every failure leaves through
//! [`infra::errors::ApiError`].

pub mod app;
pub mod extract;
pub mod infra;
pub mod routes;

pub use app::{AppBuildError, build_app};
