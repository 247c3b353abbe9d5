use std::sync::Arc;

use anyhow::Result;
use axum_test::TestServer;
use openeo_core::{
    ApiSettings, AppUnitOfWork, CapabilityRegistry, OpenEoCore,
    catalog::StaticCatalog,
    identity::{StaticTokenIdentity, TokenGrant},
};
use openeo_model::{Collection, Process};
use openeo_server::build_app;
use serde_json::{Value, json};

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const API_VERSION: &str = "1.1.0";

#[allow(unused)]
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[allow(unused)]
pub fn v(path: &str) -> String {
    format!("/{API_VERSION}{path}")
}

fn collection(value: Value) -> Collection {
    serde_json::from_value(value).expect("valid collection fixture")
}

fn process(value: Value) -> Process {
    serde_json::from_value(value).expect("valid process fixture")
}

pub fn test_settings() -> ApiSettings {
    ApiSettings {
        version: API_VERSION.to_string(),
        id: "openeo-test".to_string(),
        title: "openEO test backend".to_string(),
        description: "Backend under test".to_string(),
        ..ApiSettings::default()
    }
}

/// Backend over the in-memory store with two known users.
pub fn test_backend() -> OpenEoCore {
    let registry = CapabilityRegistry::new(test_settings()).expect("valid settings");
    let identity = StaticTokenIdentity::new([
        TokenGrant {
            token: ALICE_TOKEN.into(),
            subject: "alice".into(),
        },
        TokenGrant {
            token: BOB_TOKEN.into(),
            subject: "bob".into(),
        },
    ]);
    let catalog = Arc::new(StaticCatalog::new(
        vec![collection(json!({
            "stac_version": "1.0.0",
            "id": "SENTINEL2_L2A",
            "description": "Sentinel-2 bottom of atmosphere reflectance",
            "license": "proprietary"
        }))],
        vec![process(json!({
            "id": "ndvi",
            "summary": "Normalized Difference Vegetation Index"
        }))],
    ));

    OpenEoCore::new(
        registry,
        AppUnitOfWork::in_memory(),
        Arc::new(identity),
        catalog.clone(),
        catalog,
    )
}

pub fn test_server() -> Result<TestServer> {
    let app = build_app(Arc::new(test_backend()))?;
    TestServer::new(app)
}

#[allow(unused)]
pub fn ndvi_job() -> Value {
    json!({
        "title": "NDVI based on Sentinel 2",
        "description": "Deriving minimum NDVI measurements over pixel time series",
        "process": {
            "process_graph": {
                "loadco1": {
                    "process_id": "load_collection",
                    "arguments": {"id": "SENTINEL2_L2A", "spatial_extent": null}
                },
                "ndvi1": {
                    "process_id": "ndvi",
                    "arguments": {"data": {"from_node": "loadco1"}},
                    "result": true
                }
            }
        }
    })
}
