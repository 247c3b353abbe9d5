//! Capability registry: what this backend declares it can do.
//!
//! Everything here is computed once from startup configuration and is
//! read-only afterwards. Malformed configuration surfaces as a
//! [`CapabilityError`] while the registry is being built, never while a
//! request is served.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use openeo_model::{
    Billing, Capabilities, ConformanceClasses, Endpoint, HttpMethod, Link,
    WellKnownDocument, WellKnownVersion,
};

use crate::api::routes::{self, CORE_ROUTES, names};

pub const DEFAULT_API_VERSION: &str = "1.1.0";
pub const DEFAULT_STAC_VERSION: &str = "1.0.0";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("invalid API version: {0}")]
    InvalidVersion(String),

    #[error("capabilities require a non-empty {0}")]
    MissingField(&'static str),

    #[error("declared endpoint {method} {path} is not a route this backend serves")]
    UnknownEndpoint { method: HttpMethod, path: String },

    #[error("advertised route {method} {path} is missing from the route table")]
    UnregisteredRoute { method: HttpMethod, path: String },
}

/// Backend identity and advertised features, as configured at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// API version; also the path segment every versioned route lives under.
    pub version: String,
    pub backend_version: String,
    pub stac_version: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub production: bool,
    /// Externally visible base URL used to build discovery links.
    pub public_url: Option<Url>,
    pub links: Vec<Link>,
    pub billing: Option<Billing>,
    /// Explicit endpoint list; derived from the core route set when absent.
    pub endpoints: Option<Vec<Endpoint>>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_API_VERSION.to_string(),
            backend_version: env!("CARGO_PKG_VERSION").to_string(),
            stac_version: DEFAULT_STAC_VERSION.to_string(),
            id: "openeo-backend".to_string(),
            title: "openEO backend".to_string(),
            description: "openEO API backend".to_string(),
            production: false,
            public_url: None,
            links: Vec::new(),
            billing: None,
            endpoints: None,
        }
    }
}

/// A conformance URI together with the routes that must be served for the
/// backend to claim it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceClass {
    pub uri: String,
    pub requires: &'static [&'static str],
}

/// Conformance classes this backend knows how to satisfy.
pub fn conformance_classes(api_version: &str) -> Vec<ConformanceClass> {
    vec![
        ConformanceClass {
            uri: format!("https://api.openeo.org/{api_version}"),
            requires: &[names::CAPABILITIES, names::CONFORMANCE, names::WELL_KNOWN],
        },
        ConformanceClass {
            uri: "https://api.stacspec.org/v1.0.0/core".to_string(),
            requires: &[names::CAPABILITIES],
        },
        ConformanceClass {
            uri: "https://api.stacspec.org/v1.0.0/collections".to_string(),
            requires: &[names::COLLECTIONS, names::COLLECTION],
        },
    ]
}

#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    settings: ApiSettings,
    capabilities: Capabilities,
    conformance: ConformanceClasses,
    well_known: WellKnownDocument,
}

impl CapabilityRegistry {
    pub fn new(settings: ApiSettings) -> Result<Self, CapabilityError> {
        routes::validate_version_segment(&settings.version)
            .map_err(CapabilityError::InvalidVersion)?;
        if settings.title.trim().is_empty() {
            return Err(CapabilityError::MissingField("title"));
        }
        if settings.id.trim().is_empty() {
            return Err(CapabilityError::MissingField("id"));
        }

        let endpoints = match &settings.endpoints {
            Some(declared) => {
                validate_declared_endpoints(declared)?;
                declared.clone()
            }
            None => derive_endpoints(),
        };

        let conforms_to: Vec<String> = conformance_classes(&settings.version)
            .into_iter()
            .filter(|class| {
                class
                    .requires
                    .iter()
                    .all(|name| routes::core_route(name).is_some())
            })
            .map(|class| class.uri)
            .collect();

        let capabilities = Capabilities {
            api_version: settings.version.clone(),
            backend_version: settings.backend_version.clone(),
            stac_version: settings.stac_version.clone(),
            catalog_type: "Catalog".to_string(),
            id: settings.id.clone(),
            title: settings.title.clone(),
            description: settings.description.clone(),
            production: settings.production,
            conforms_to: conforms_to.clone(),
            endpoints,
            billing: settings.billing.clone(),
            links: settings.links.clone(),
        };

        let well_known = WellKnownDocument {
            versions: vec![WellKnownVersion {
                url: api_root_url(settings.public_url.as_ref(), &settings.version),
                api_version: settings.version.clone(),
                production: settings.production,
            }],
        };

        debug!(
            version = %settings.version,
            endpoints = capabilities.endpoints.len(),
            conformance = conforms_to.len(),
            "capability registry built"
        );

        Ok(Self {
            settings,
            capabilities,
            conformance: ConformanceClasses { conforms_to },
            well_known,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn api_version(&self) -> &str {
        &self.settings.version
    }

    pub fn describe_backend(&self) -> Capabilities {
        self.capabilities.clone()
    }

    pub fn list_conformance(&self) -> ConformanceClasses {
        self.conformance.clone()
    }

    pub fn well_known(&self) -> WellKnownDocument {
        self.well_known.clone()
    }

    /// Confirms that every advertised endpoint is actually served.
    ///
    /// `registered` yields `(method, concrete path)` pairs from the route
    /// table the transport built.
    pub fn verify_routes<'a, I>(&self, registered: I) -> Result<(), CapabilityError>
    where
        I: IntoIterator<Item = (HttpMethod, &'a str)>,
    {
        let registered: Vec<(HttpMethod, &str)> = registered.into_iter().collect();
        for endpoint in &self.capabilities.endpoints {
            let path = routes::versioned_path(&self.settings.version, &endpoint.path);
            for method in &endpoint.methods {
                if !registered.contains(&(*method, path.as_str())) {
                    return Err(CapabilityError::UnregisteredRoute {
                        method: *method,
                        path,
                    });
                }
            }
        }

        for class in conformance_classes(&self.settings.version) {
            if !self.conformance.conforms_to.contains(&class.uri) {
                continue;
            }
            for name in class.requires {
                let Some(route) = routes::core_route(name) else {
                    continue;
                };
                let path = route.path(&self.settings.version);
                if !registered.contains(&(route.method, path.as_str())) {
                    return Err(CapabilityError::UnregisteredRoute {
                        method: route.method,
                        path,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Groups the versioned core routes by path template, keeping first-seen order.
fn derive_endpoints() -> Vec<Endpoint> {
    let mut endpoints: Vec<Endpoint> = Vec::new();
    for route in CORE_ROUTES.iter().filter(|route| route.versioned) {
        match endpoints.iter_mut().find(|e| e.path == route.template) {
            Some(endpoint) => endpoint.methods.push(route.method),
            None => endpoints.push(Endpoint {
                path: route.template.to_string(),
                methods: vec![route.method],
            }),
        }
    }
    endpoints
}

fn validate_declared_endpoints(declared: &[Endpoint]) -> Result<(), CapabilityError> {
    for endpoint in declared {
        for method in &endpoint.methods {
            let known = CORE_ROUTES.iter().any(|route| {
                route.versioned && route.template == endpoint.path && route.method == *method
            });
            if !known {
                return Err(CapabilityError::UnknownEndpoint {
                    method: *method,
                    path: endpoint.path.clone(),
                });
            }
        }
    }
    Ok(())
}

fn api_root_url(public_url: Option<&Url>, version: &str) -> String {
    match public_url {
        Some(base) => format!("{}/{version}/", base.as_str().trim_end_matches('/')),
        None => routes::versioned_path(version, "/"),
    }
}
