use openeo_model::HttpMethod;

/// Path templates relative to the versioned API root.
pub mod paths {
    pub const WELL_KNOWN: &str = "/.well-known/openeo";
    pub const CAPABILITIES: &str = "/";
    pub const CONFORMANCE: &str = "/conformance";
    pub const COLLECTIONS: &str = "/collections";
    pub const COLLECTION: &str = "/collections/{collection_id}";
    pub const PROCESSES: &str = "/processes";
    pub const JOBS: &str = "/jobs";
    pub const JOB: &str = "/jobs/{job_id}";
}

/// Endpoint names as they appear in the route table.
pub mod names {
    pub const WELL_KNOWN: &str = ".well-known";
    pub const CAPABILITIES: &str = "capabilities";
    pub const CONFORMANCE: &str = "conformance";
    pub const COLLECTIONS: &str = "collections";
    pub const COLLECTION: &str = "collection";
    pub const PROCESSES: &str = "processes";
    pub const GET_JOBS: &str = "get_jobs";
    pub const POST_JOB: &str = "post_job";
    pub const GET_JOB: &str = "get_job";
}

/// Declaration of one route served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub name: &'static str,
    pub method: HttpMethod,
    pub template: &'static str,
    /// Whether the path lives under the `/{version}` prefix.
    pub versioned: bool,
}

impl RouteSpec {
    const fn versioned(
        name: &'static str,
        method: HttpMethod,
        template: &'static str,
    ) -> Self {
        Self {
            name,
            method,
            template,
            versioned: true,
        }
    }

    /// Concrete request path for the given API version segment.
    pub fn path(&self, version: &str) -> String {
        if self.versioned {
            versioned_path(version, self.template)
        } else {
            self.template.to_string()
        }
    }
}

/// The fixed core route set, in registration order. The capabilities root is
/// registered last, after the core set.
pub const CORE_ROUTES: &[RouteSpec] = &[
    RouteSpec::versioned(names::CONFORMANCE, HttpMethod::Get, paths::CONFORMANCE),
    RouteSpec::versioned(names::COLLECTIONS, HttpMethod::Get, paths::COLLECTIONS),
    RouteSpec::versioned(names::COLLECTION, HttpMethod::Get, paths::COLLECTION),
    RouteSpec::versioned(names::PROCESSES, HttpMethod::Get, paths::PROCESSES),
    RouteSpec::versioned(names::GET_JOBS, HttpMethod::Get, paths::JOBS),
    RouteSpec::versioned(names::POST_JOB, HttpMethod::Post, paths::JOBS),
    RouteSpec::versioned(names::GET_JOB, HttpMethod::Get, paths::JOB),
    RouteSpec {
        name: names::WELL_KNOWN,
        method: HttpMethod::Get,
        template: paths::WELL_KNOWN,
        versioned: false,
    },
    RouteSpec::versioned(names::CAPABILITIES, HttpMethod::Get, paths::CAPABILITIES),
];

pub fn core_route(name: &str) -> Option<&'static RouteSpec> {
    CORE_ROUTES.iter().find(|route| route.name == name)
}

/// `/{version}{template}`; the root template `/` yields `/{version}/`.
pub fn versioned_path(version: &str, template: &str) -> String {
    format!("/{version}{template}")
}

/// A version segment must be a single, literal path segment.
pub fn validate_version_segment(version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err("API version must not be empty".into());
    }
    if let Some(bad) = version
        .chars()
        .find(|c| matches!(c, '/' | '{' | '}' | '?' | '#' | '*') || c.is_whitespace())
    {
        return Err(format!(
            "API version '{version}' contains invalid character '{bad}'"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn core_routes_have_unique_method_and_path() {
        let mut seen = HashSet::new();
        for route in CORE_ROUTES {
            assert!(
                seen.insert((route.method, route.path("1.1.0"))),
                "duplicate route {} {}",
                route.method,
                route.template
            );
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn capabilities_root_keeps_trailing_slash() {
        let route = core_route(names::CAPABILITIES).unwrap();
        assert_eq!(route.path("1.1.0"), "/1.1.0/");
    }

    #[test]
    fn well_known_is_not_versioned() {
        let route = core_route(names::WELL_KNOWN).unwrap();
        assert_eq!(route.path("1.1.0"), "/.well-known/openeo");
    }

    #[test]
    fn version_segment_validation() {
        assert!(validate_version_segment("1.1.0").is_ok());
        assert!(validate_version_segment("").is_err());
        assert!(validate_version_segment("1.1/0").is_err());
        assert!(validate_version_segment("{v}").is_err());
        assert!(validate_version_segment("1 1").is_err());
    }
}
