use async_trait::async_trait;
use openeo_model::{Collection, Collections};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use super::CollectionCatalog;
use crate::error::{CoreError, Result};

/// Collections served by forwarding to an upstream STAC API.
#[derive(Debug, Clone)]
pub struct StacCollections {
    http: reqwest::Client,
    base: Url,
}

impl StacCollections {
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    pub fn with_client(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    /// Appends `segments` to the base path; each one is percent-encoded, so a
    /// segment can never climb out of its position or add a query.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::internal(format!("STAC API URL {} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `Ok(None)` for an upstream 404.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            error!(%url, "STAC request failed: {e}");
            CoreError::internal(format!("STAC request failed: {e}"))
        })?;

        let status = response.status();
        debug!(%url, %status, "STAC response");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CoreError::internal(format!(
                "STAC API responded with status {status}"
            )));
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| CoreError::internal(format!("Invalid STAC response: {e}")))
    }
}

#[async_trait]
impl CollectionCatalog for StacCollections {
    async fn list_collections(&self) -> Result<Collections> {
        self.get_json::<Collections>(self.url(&["collections"])?)
            .await?
            .ok_or_else(|| CoreError::internal("STAC API has no collections endpoint"))
    }

    async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        // Dot segments are dropped by URL normalization and would address the listing.
        if collection_id.is_empty() || collection_id == "." || collection_id == ".." {
            return Err(CoreError::collection_not_found(collection_id));
        }
        let url = self.url(&["collections", collection_id])?;
        self.get_json::<Collection>(url)
            .await?
            .ok_or_else(|| CoreError::collection_not_found(collection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stac(base: &str) -> StacCollections {
        StacCollections::new(Url::parse(base).unwrap())
    }

    #[test]
    fn joins_paths_onto_base_without_double_slash() {
        let nested = stac("https://stac.example.org/api/");
        assert_eq!(
            nested.url(&["collections"]).unwrap().as_str(),
            "https://stac.example.org/api/collections"
        );

        let bare = stac("https://stac.example.org");
        assert_eq!(
            bare.url(&["collections", "S2"]).unwrap().as_str(),
            "https://stac.example.org/collections/S2"
        );
    }

    #[test]
    fn collection_ids_stay_inside_their_segment() {
        let stac = stac("https://stac.example.org/api/");

        let traversal = stac.url(&["collections", "../search"]).unwrap();
        assert_eq!(
            traversal.as_str(),
            "https://stac.example.org/api/collections/..%2Fsearch"
        );

        let query = stac.url(&["collections", "S2?limit=1"]).unwrap();
        assert_eq!(query.query(), None);
        assert_eq!(
            query.as_str(),
            "https://stac.example.org/api/collections/S2%3Flimit=1"
        );

        let fragment = stac.url(&["collections", "S2#x"]).unwrap();
        assert_eq!(fragment.fragment(), None);
    }

    #[tokio::test]
    async fn dot_segment_ids_are_not_found_without_a_request() {
        // Unroutable base: any request attempt would surface as Internal.
        let stac = stac("http://127.0.0.1:9/");
        for id in ["..", ".", ""] {
            let err = stac.get_collection(id).await.unwrap_err();
            assert_eq!(err.code(), "CollectionNotFound", "{id:?}");
        }
    }
}
