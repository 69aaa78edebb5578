//! NahCloud Storage Buckets

use super::client::NahClient;
use super::error::Result;
use super::types::{Bucket, CreateNamedRequest, UpdateBucketRequest};
use reqwest::Method;

const COLLECTION: &str = "buckets";

impl NahClient {
    /// Create a bucket
    pub async fn create_bucket(&self, name: &str) -> Result<Bucket> {
        let body = CreateNamedRequest {
            name: name.to_string(),
        };
        body.validate()?;

        let url = self.collection_url(COLLECTION);
        self.http.request_json(Method::POST, &url, Some(&body)).await
    }

    /// Fetch a bucket by id
    pub async fn get_bucket(&self, id: &str) -> Result<Bucket> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json::<(), _>(Method::GET, &url, None).await
    }

    /// Apply a partial update to a bucket
    pub async fn update_bucket(&self, id: &str, req: &UpdateBucketRequest) -> Result<Bucket> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json(Method::PATCH, &url, Some(req)).await
    }

    /// Delete a bucket
    pub async fn delete_bucket(&self, id: &str) -> Result<()> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_empty(Method::DELETE, &url).await
    }
}
