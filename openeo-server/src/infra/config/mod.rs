//! Configuration: `.env`, then a TOML file, then environment overrides.

pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{AuthConfig, CatalogConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig};
