//! Collection and process discovery.
//!
//! The core never interprets collection or process metadata beyond the `id`;
//! these sources only decide where the documents come from.

pub mod local;
pub mod stac;

use async_trait::async_trait;
use openeo_model::{Collection, Collections, Processes};

use crate::error::Result;

pub use local::StaticCatalog;
pub use stac::StacCollections;

#[async_trait]
pub trait CollectionCatalog: Send + Sync {
    async fn list_collections(&self) -> Result<Collections>;

    /// Fails with `CollectionNotFound` for an unknown id.
    async fn get_collection(&self, collection_id: &str) -> Result<Collection>;
}

#[async_trait]
pub trait ProcessCatalog: Send + Sync {
    async fn list_processes(&self) -> Result<Processes>;
}
