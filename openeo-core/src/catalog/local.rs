use std::path::Path;

use async_trait::async_trait;
use openeo_model::{Collection, Collections, Process, Processes};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use super::{CollectionCatalog, ProcessCatalog};
use crate::error::{CoreError, Result};

/// Catalog held in memory, optionally loaded from JSON files at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    collections: Vec<Collection>,
    processes: Vec<Process>,
}

// Files may hold either the full listing document or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionsFile {
    Document { collections: Vec<Collection> },
    List(Vec<Collection>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProcessesFile {
    Document { processes: Vec<Process> },
    List(Vec<Process>),
}

impl StaticCatalog {
    pub fn new(collections: Vec<Collection>, processes: Vec<Process>) -> Self {
        Self {
            collections,
            processes,
        }
    }

    pub fn from_files(
        collections_path: Option<&Path>,
        processes_path: Option<&Path>,
    ) -> Result<Self> {
        let collections = match collections_path {
            Some(path) => match read_json::<CollectionsFile>(path)? {
                CollectionsFile::Document { collections } | CollectionsFile::List(collections) => {
                    collections
                }
            },
            None => Vec::new(),
        };
        let processes = match processes_path {
            Some(path) => match read_json::<ProcessesFile>(path)? {
                ProcessesFile::Document { processes } | ProcessesFile::List(processes) => processes,
            },
            None => Vec::new(),
        };

        info!(
            collections = collections.len(),
            processes = processes.len(),
            "static catalog loaded"
        );
        Ok(Self::new(collections, processes))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::internal(format!("Failed to read catalog file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        CoreError::internal(format!("Failed to parse catalog file {}: {e}", path.display()))
    })
}

#[async_trait]
impl CollectionCatalog for StaticCatalog {
    async fn list_collections(&self) -> Result<Collections> {
        Ok(Collections {
            collections: self.collections.clone(),
            links: Vec::new(),
        })
    }

    async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        self.collections
            .iter()
            .find(|collection| collection.id == collection_id)
            .cloned()
            .ok_or_else(|| CoreError::collection_not_found(collection_id))
    }
}

#[async_trait]
impl ProcessCatalog for StaticCatalog {
    async fn list_processes(&self) -> Result<Processes> {
        Ok(Processes {
            processes: self.processes.clone(),
            links: Vec::new(),
        })
    }
}
