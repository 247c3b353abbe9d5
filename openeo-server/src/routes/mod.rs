//! Route table construction.
//!
//! [`RouteDispatcher`] binds each endpoint to a handler over an injected
//! [`OpenEoBackend`] and records what it registered. The table is built once
//! at startup; a bad registration is a [`DispatchError`], never a panic.

pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    handler::Handler,
    http::StatusCode,
    routing::{MethodFilter, on},
};
use openeo_core::{
    OpenEoBackend,
    api::routes::{self, CORE_ROUTES, RouteSpec, names},
};
use openeo_model::HttpMethod;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("route {method} {path} already registered as '{existing}'")]
    DuplicateRoute {
        method: HttpMethod,
        path: String,
        existing: &'static str,
    },

    #[error("route '{name}' has invalid path '{path}'")]
    InvalidPath { name: &'static str, path: String },

    #[error("route '{0}' declares no HTTP methods")]
    NoMethods(&'static str),

    #[error("no handler is bound to core route '{0}'")]
    UnboundRoute(&'static str),
}

/// What a successful response from a route looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseContract {
    pub status: StatusCode,
    /// Name of the JSON document returned, `None` for an empty body.
    pub document: Option<&'static str>,
}

impl ResponseContract {
    pub const fn json(document: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            document: Some(document),
        }
    }

    pub const fn created() -> Self {
        Self {
            status: StatusCode::CREATED,
            document: None,
        }
    }
}

/// One registered `(method, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: String,
    pub contract: ResponseContract,
}

pub struct RouteDispatcher<B: OpenEoBackend> {
    backend: Arc<B>,
    version: String,
    router: Router<Arc<B>>,
    entries: Vec<RouteEntry>,
}

impl<B: OpenEoBackend> std::fmt::Debug for RouteDispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDispatcher")
            .field("version", &self.version)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

impl<B: OpenEoBackend> RouteDispatcher<B> {
    /// Dispatcher for one API version; `version` becomes the path prefix.
    pub fn new(backend: Arc<B>, version: impl Into<String>) -> Self {
        Self {
            backend,
            version: version.into(),
            router: Router::new(),
            entries: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Adds a handler for `path` under each of `methods`.
    pub fn register<H, T>(
        &mut self,
        name: &'static str,
        path: &str,
        methods: &[HttpMethod],
        handler: H,
        contract: ResponseContract,
    ) -> Result<(), DispatchError>
    where
        H: Handler<T, Arc<B>>,
        T: 'static,
    {
        if !path.starts_with('/') {
            return Err(DispatchError::InvalidPath {
                name,
                path: path.to_string(),
            });
        }
        let Some((first, rest)) = methods.split_first() else {
            return Err(DispatchError::NoMethods(name));
        };

        for method in methods {
            if let Some(existing) = self
                .entries
                .iter()
                .find(|entry| entry.method == *method && entry.path == path)
            {
                return Err(DispatchError::DuplicateRoute {
                    method: *method,
                    path: path.to_string(),
                    existing: existing.name,
                });
            }
        }
        // Also reject a method listed twice in the same call.
        for (i, method) in methods.iter().enumerate() {
            if methods[..i].contains(method) {
                return Err(DispatchError::DuplicateRoute {
                    method: *method,
                    path: path.to_string(),
                    existing: name,
                });
            }
        }

        let filter = rest
            .iter()
            .fold(method_filter(*first), |acc, m| acc.or(method_filter(*m)));

        let router = std::mem::take(&mut self.router);
        self.router = router.route(path, on(filter, handler));

        for method in methods {
            debug!(name, %method, path, "route registered");
            self.entries.push(RouteEntry {
                name,
                method: *method,
                path: path.to_string(),
                contract,
            });
        }
        Ok(())
    }

    /// Registers the core set in catalog order: conformance, collections,
    /// collection, processes, job list, job create, job get, well-known.
    pub fn register_core(&mut self) -> Result<(), DispatchError> {
        for route in CORE_ROUTES
            .iter()
            .filter(|route| route.name != names::CAPABILITIES)
        {
            self.register_route_spec(route)?;
        }
        Ok(())
    }

    /// Registers the capabilities document at the versioned root.
    pub fn register_capabilities(&mut self) -> Result<(), DispatchError> {
        let route = routes::core_route(names::CAPABILITIES)
            .ok_or(DispatchError::UnboundRoute(names::CAPABILITIES))?;
        self.register_route_spec(route)
    }

    fn register_route_spec(&mut self, route: &RouteSpec) -> Result<(), DispatchError> {
        let path = route.path(&self.version);
        let methods = [route.method];
        match route.name {
            names::CONFORMANCE => self.register(
                route.name,
                &path,
                &methods,
                handlers::conformance::<B>,
                ResponseContract::json("ConformanceClasses"),
            ),
            names::COLLECTIONS => self.register(
                route.name,
                &path,
                &methods,
                handlers::collections::<B>,
                ResponseContract::json("Collections"),
            ),
            names::COLLECTION => self.register(
                route.name,
                &path,
                &methods,
                handlers::collection::<B>,
                ResponseContract::json("Collection"),
            ),
            names::PROCESSES => self.register(
                route.name,
                &path,
                &methods,
                handlers::processes::<B>,
                ResponseContract::json("Processes"),
            ),
            names::GET_JOBS => self.register(
                route.name,
                &path,
                &methods,
                handlers::list_jobs::<B>,
                ResponseContract::json("JobsDocument"),
            ),
            names::POST_JOB => self.register(
                route.name,
                &path,
                &methods,
                handlers::create_job::<B>,
                ResponseContract::created(),
            ),
            names::GET_JOB => self.register(
                route.name,
                &path,
                &methods,
                handlers::get_job::<B>,
                ResponseContract::json("BatchJob"),
            ),
            names::WELL_KNOWN => self.register(
                route.name,
                &path,
                &methods,
                handlers::well_known::<B>,
                ResponseContract::json("WellKnownDocument"),
            ),
            names::CAPABILITIES => self.register(
                route.name,
                &path,
                &methods,
                handlers::capabilities::<B>,
                ResponseContract::json("Capabilities"),
            ),
            other => Err(DispatchError::UnboundRoute(other)),
        }
    }

    /// The route table in registration order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Finalizes the table: unknown paths and unsupported methods get
    /// normalized errors, and the backend becomes the router state.
    pub fn into_router(self) -> Router {
        self.router
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .fallback(handlers::not_found)
            .with_state(self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use openeo_core::{ApiSettings, CapabilityRegistry, Result as CoreResult};
    use openeo_model::{
        BatchJob, Collection, Collections, JobCreateRequest, JobId, JobsDocument,
        Processes, User,
    };

    struct NullBackend {
        registry: CapabilityRegistry,
    }

    #[async_trait]
    impl OpenEoBackend for NullBackend {
        fn capability_registry(&self) -> &CapabilityRegistry {
            &self.registry
        }
        async fn authenticate(&self, _: Option<&str>) -> CoreResult<User> {
            unimplemented!()
        }
        async fn get_collections(&self) -> CoreResult<Collections> {
            unimplemented!()
        }
        async fn get_collection(&self, _: &str) -> CoreResult<Collection> {
            unimplemented!()
        }
        async fn list_processes(&self) -> CoreResult<Processes> {
            unimplemented!()
        }
        async fn list_jobs(&self, _: &User) -> CoreResult<JobsDocument> {
            unimplemented!()
        }
        async fn create_job(&self, _: &User, _: JobCreateRequest) -> CoreResult<JobId> {
            unimplemented!()
        }
        async fn get_job(&self, _: &User, _: JobId) -> CoreResult<BatchJob> {
            unimplemented!()
        }
    }

    fn dispatcher() -> RouteDispatcher<NullBackend> {
        let backend = NullBackend {
            registry: CapabilityRegistry::new(ApiSettings::default()).unwrap(),
        };
        RouteDispatcher::new(Arc::new(backend), "1.1.0")
    }

    #[test]
    fn core_registration_order_and_completeness() {
        let mut dispatcher = dispatcher();
        dispatcher.register_core().unwrap();
        dispatcher.register_capabilities().unwrap();

        let names: Vec<&str> = dispatcher.routes().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "conformance",
                "collections",
                "collection",
                "processes",
                "get_jobs",
                "post_job",
                "get_job",
                ".well-known",
                "capabilities",
            ]
        );
        assert_eq!(dispatcher.routes()[8].path, "/1.1.0/");
        assert_eq!(dispatcher.routes()[7].path, "/.well-known/openeo");
        assert_eq!(dispatcher.routes()[5].contract, ResponseContract::created());
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut dispatcher = dispatcher();
        dispatcher.register_core().unwrap();

        let err = dispatcher.register_core().unwrap_err();
        assert_eq!(
            err,
            DispatchError::DuplicateRoute {
                method: HttpMethod::Get,
                path: "/1.1.0/conformance".into(),
                existing: "conformance",
            }
        );
    }

    #[test]
    fn same_path_different_methods_is_allowed() {
        let mut dispatcher = dispatcher();
        dispatcher
            .register(
                "things",
                "/1.1.0/things",
                &[HttpMethod::Get, HttpMethod::Delete],
                handlers::not_found,
                ResponseContract::json("Things"),
            )
            .unwrap();
        dispatcher
            .register(
                "put_thing",
                "/1.1.0/things",
                &[HttpMethod::Put],
                handlers::not_found,
                ResponseContract::json("Thing"),
            )
            .unwrap();
        assert_eq!(dispatcher.routes().len(), 3);

        let err = dispatcher
            .register(
                "again",
                "/1.1.0/things",
                &[HttpMethod::Delete],
                handlers::not_found,
                ResponseContract::json("Thing"),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateRoute { existing: "things", .. }));
    }

    #[test]
    fn malformed_registrations_are_rejected() {
        let mut dispatcher = dispatcher();
        assert_eq!(
            dispatcher
                .register("x", "/x", &[], handlers::not_found, ResponseContract::created())
                .unwrap_err(),
            DispatchError::NoMethods("x")
        );
        assert!(matches!(
            dispatcher
                .register(
                    "y",
                    "y",
                    &[HttpMethod::Get],
                    handlers::not_found,
                    ResponseContract::created()
                )
                .unwrap_err(),
            DispatchError::InvalidPath { .. }
        ));
        assert!(matches!(
            dispatcher
                .register(
                    "z",
                    "/z",
                    &[HttpMethod::Get, HttpMethod::Get],
                    handlers::not_found,
                    ResponseContract::created()
                )
                .unwrap_err(),
            DispatchError::DuplicateRoute { .. }
        ));
        assert!(dispatcher.routes().is_empty());
    }
}
