//! NahCloud Metadata

use super::client::NahClient;
use super::error::Result;
use super::types::{CreateMetadataRequest, Metadata, UpdateMetadataRequest};
use reqwest::Method;

const COLLECTION: &str = "metadata";

impl NahClient {
    /// Create a metadata entry at `path`
    pub async fn create_metadata(&self, path: &str, value: &str) -> Result<Metadata> {
        let body = CreateMetadataRequest {
            path: path.to_string(),
            value: value.to_string(),
        };
        body.validate()?;

        let url = self.collection_url(COLLECTION);
        self.http.request_json(Method::POST, &url, Some(&body)).await
    }

    /// Fetch a metadata entry by id
    pub async fn get_metadata(&self, id: &str) -> Result<Metadata> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json::<(), _>(Method::GET, &url, None).await
    }

    /// Apply a partial update to a metadata entry
    pub async fn update_metadata(&self, id: &str, req: &UpdateMetadataRequest) -> Result<Metadata> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json(Method::PATCH, &url, Some(req)).await
    }

    /// Delete a metadata entry
    pub async fn delete_metadata(&self, id: &str) -> Result<()> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_empty(Method::DELETE, &url).await
    }
}
