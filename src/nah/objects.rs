//! NahCloud Storage Objects
//!
//! Objects are addressed through their bucket: every call takes the bucket id
//! as well as the object id.

use super::client::NahClient;
use super::error::Result;
use super::types::{CreateObjectRequest, Object, UpdateObjectRequest};
use reqwest::Method;

impl NahClient {
    /// Create an object in a bucket
    pub async fn create_object(&self, bucket_id: &str, req: &CreateObjectRequest) -> Result<Object> {
        let url = self.bucket_objects_url(bucket_id)?;
        req.validate()?;

        self.http.request_json(Method::POST, &url, Some(req)).await
    }

    /// Fetch an object by bucket and object id
    pub async fn get_object(&self, bucket_id: &str, id: &str) -> Result<Object> {
        let url = self.bucket_object_url(bucket_id, id)?;
        self.http.request_json::<(), _>(Method::GET, &url, None).await
    }

    /// Apply a partial update to an object
    pub async fn update_object(
        &self,
        bucket_id: &str,
        id: &str,
        req: &UpdateObjectRequest,
    ) -> Result<Object> {
        let url = self.bucket_object_url(bucket_id, id)?;
        self.http.request_json(Method::PATCH, &url, Some(req)).await
    }

    /// Delete an object
    pub async fn delete_object(&self, bucket_id: &str, id: &str) -> Result<()> {
        let url = self.bucket_object_url(bucket_id, id)?;
        self.http.request_empty(Method::DELETE, &url).await
    }
}
