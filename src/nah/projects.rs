//! NahCloud Projects

use super::client::NahClient;
use super::error::Result;
use super::types::{CreateNamedRequest, Project, UpdateProjectRequest};
use reqwest::Method;

const COLLECTION: &str = "projects";

impl NahClient {
    /// Create a project
    pub async fn create_project(&self, name: &str) -> Result<Project> {
        let body = CreateNamedRequest {
            name: name.to_string(),
        };
        body.validate()?;

        let url = self.collection_url(COLLECTION);
        self.http.request_json(Method::POST, &url, Some(&body)).await
    }

    /// Fetch a project by id
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json::<(), _>(Method::GET, &url, None).await
    }

    /// Apply a partial update to a project
    pub async fn update_project(&self, id: &str, req: &UpdateProjectRequest) -> Result<Project> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_json(Method::PATCH, &url, Some(req)).await
    }

    /// Delete a project
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let url = self.item_url(COLLECTION, id)?;
        self.http.request_empty(Method::DELETE, &url).await
    }
}
