use std::sync::Arc;

use axum::{Router, http::HeaderName};
use openeo_core::{CapabilityError, OpenEoBackend};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::infra::errors::panic_response;
use crate::routes::{DispatchError, RouteDispatcher, handlers::OPENEO_IDENTIFIER};

#[derive(Error, Debug)]
pub enum AppBuildError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Capabilities(#[from] CapabilityError),
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            axum::http::header::LOCATION,
            HeaderName::from_static(OPENEO_IDENTIFIER),
        ])
}

/// Builds the complete HTTP application for `backend`.
///
/// Registers the core routes and the capabilities root, then checks that
/// everything the capabilities document advertises is actually routed.
pub fn build_app<B: OpenEoBackend>(backend: Arc<B>) -> Result<Router, AppBuildError> {
    let version = backend.capability_registry().api_version().to_string();
    let mut dispatcher = RouteDispatcher::new(Arc::clone(&backend), version);
    dispatcher.register_core()?;
    dispatcher.register_capabilities()?;

    backend.capability_registry().verify_routes(
        dispatcher
            .routes()
            .iter()
            .map(|entry| (entry.method, entry.path.as_str())),
    )?;
    info!(
        version = dispatcher.version(),
        routes = dispatcher.routes().len(),
        "route table built"
    );

    Ok(dispatcher.into_router().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer())
            .layer(CatchPanicLayer::custom(panic_response)),
    ))
}
