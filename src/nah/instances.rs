//! NahCloud Compute Instances
//!
//! Instances belong to exactly one project. `project_id` is fixed at creation;
//! moving an instance means deleting and recreating it.

use super::client::NahClient;
use super::error::Result;
use super::types::{CreateInstanceRequest, Instance, UpdateInstanceRequest};
use reqwest::Method;

const COLLECTION: &str = "instances";

impl NahClient {
    /// Create an instance
    pub async fn create_instance(&self, req: &CreateInstanceRequest) -> Result<Instance> {
        req.validate()?;

        let url = self.collection_url(COLLECTION);
        self.http.request_json(Method::POST, &url, Some(req)).await
    }

    /// Fetch an instance by id
    pub async fn get_instance(&self, id: &str) -> Result<Instance> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json::<(), _>(Method::GET, &url, None).await
    }

    /// Apply a partial update to an instance
    pub async fn update_instance(&self, id: &str, req: &UpdateInstanceRequest) -> Result<Instance> {
        req.validate()?;

        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json(Method::PATCH, &url, Some(req)).await
    }

    /// Delete an instance
    pub async fn delete_instance(&self, id: &str) -> Result<()> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_empty(Method::DELETE, &url).await
    }
}
