use std::sync::Arc;

use anyhow::Context;
use openeo_core::{
    AppUnitOfWork, CapabilityRegistry, OpenEoCore,
    catalog::{CollectionCatalog, ProcessCatalog, StacCollections, StaticCatalog},
    database::PostgresDatabase,
    identity::StaticTokenIdentity,
};
use tracing::{info, warn};

use super::config::{Config, DatabaseConfig};

/// Opens the pool and, when configured, brings the schema up to date.
pub async fn connect_database(config: &DatabaseConfig) -> anyhow::Result<PostgresDatabase> {
    let database = PostgresDatabase::connect(&config.url, config.pool.clone())
        .await
        .context("failed to connect to PostgreSQL")?;
    if config.run_migrations {
        database
            .migrate()
            .await
            .context("failed to run database migrations")?;
        info!("database migrations applied");
    }
    Ok(database)
}

/// Wires the core services described by `config` into a backend.
pub async fn build_backend(config: &Config) -> anyhow::Result<OpenEoCore> {
    let registry = CapabilityRegistry::new(config.api.clone())
        .context("invalid [api] configuration")?;

    let uow = match &config.database {
        Some(database) => AppUnitOfWork::postgres(&connect_database(database).await?),
        None => {
            warn!("running with the in-memory store; jobs are lost on restart");
            AppUnitOfWork::in_memory()
        }
    };

    let identity = Arc::new(StaticTokenIdentity::new(config.auth.tokens.iter().cloned()));

    let local = Arc::new(
        StaticCatalog::from_files(
            config.catalog.collections_path.as_deref(),
            config.catalog.processes_path.as_deref(),
        )
        .context("failed to load catalog files")?,
    );
    let collections: Arc<dyn CollectionCatalog> = match &config.catalog.stac_api_url {
        Some(url) => {
            info!(stac_api = %url, "collections are served from a STAC API");
            Arc::new(StacCollections::new(url.clone()))
        }
        None => Arc::clone(&local) as Arc<dyn CollectionCatalog>,
    };
    let processes: Arc<dyn ProcessCatalog> = local;

    Ok(OpenEoCore::new(registry, uow, identity, collections, processes))
}
