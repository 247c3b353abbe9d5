use std::path::PathBuf;

use openeo_core::{ApiSettings, database::postgres::PoolSettings, identity::TokenGrant};
use serde::Deserialize;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileDatabaseConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub run_migrations: bool,
    #[serde(flatten)]
    pub pool: PoolSettings,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileCatalogConfig {
    pub stac_api_url: Option<String>,
    pub collections_path: Option<PathBuf>,
    pub processes_path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileAuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

/// Overrides read from the process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub api_version: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub stac_api_url: Option<String>,
    pub public_url: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("OPENEO_CONFIG").ok().map(PathBuf::from),
            api_version: non_empty_var("OPENEO_VERSION"),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            database_url: non_empty_var("DATABASE_URL"),
            stac_api_url: non_empty_var("STAC_API_URL"),
            public_url: non_empty_var("OPENEO_PUBLIC_URL"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
