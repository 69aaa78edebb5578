//! NahCloud entity records and request payloads.

use super::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A NahCloud project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Power state of a compute instance
///
/// States other than `running` and `stopped` are carried verbatim in
/// [`InstanceStatus::Other`], so they are sent and printed exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Running,
    Stopped,
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            _ => Self::Other(raw),
        }
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A NahCloud compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub cpu: u32,
    pub memory_mb: u32,
    pub image: String,
    pub status: InstanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A NahCloud key-value metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub path: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A NahCloud storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A NahCloud storage object. `content` is passed through untouched; callers
/// own its encoding (base64 by convention).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: String,
    pub bucket_id: String,
    pub path: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Partial updates
// =============================================================================

/// A single field of a PATCH payload.
///
/// `Unchanged` fields are left out of the request body entirely, so the server
/// keeps its current value. `Set(v)` is sent as `v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged => None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unchanged, Self::Set)
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Unchanged => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}

// =============================================================================
// Request payloads
// =============================================================================

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidRequest(format!("{} must be at least 1", field)));
    }
    Ok(())
}

/// Body of `POST /v1/projects` and `POST /v1/buckets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNamedRequest {
    pub name: String,
}

impl CreateNamedRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)
    }
}

/// Body of `PATCH /v1/projects/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub name: FieldUpdate<String>,
}

impl UpdateProjectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = FieldUpdate::Set(name.into());
        self
    }
}

/// Body of `PATCH /v1/buckets/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBucketRequest {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub name: FieldUpdate<String>,
}

impl UpdateBucketRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = FieldUpdate::Set(name.into());
        self
    }
}

/// Body of `POST /v1/instances`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInstanceRequest {
    pub project_id: String,
    pub name: String,
    pub cpu: u32,
    pub memory_mb: u32,
    pub image: String,
    /// Server picks the initial state when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InstanceStatus>,
}

impl CreateInstanceRequest {
    /// Request with 1 CPU, 512 MB of memory and the server's default status
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            cpu: 1,
            memory_mb: 512,
            image: image.into(),
            status: None,
        }
    }

    pub fn cpu(mut self, cpu: u32) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn memory_mb(mut self, memory_mb: u32) -> Self {
        self.memory_mb = memory_mb;
        self
    }

    pub fn status(mut self, status: InstanceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("project_id", &self.project_id)?;
        require_non_empty("name", &self.name)?;
        require_non_empty("image", &self.image)?;
        require_positive("cpu", self.cpu)?;
        require_positive("memory_mb", self.memory_mb)?;
        if let Some(status) = &self.status {
            require_non_empty("status", status.as_str())?;
        }
        Ok(())
    }
}

/// Body of `PATCH /v1/instances/{id}`. `project_id` is not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInstanceRequest {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub name: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub cpu: FieldUpdate<u32>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub memory_mb: FieldUpdate<u32>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub image: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub status: FieldUpdate<InstanceStatus>,
}

impl UpdateInstanceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = FieldUpdate::Set(name.into());
        self
    }

    pub fn cpu(mut self, cpu: u32) -> Self {
        self.cpu = FieldUpdate::Set(cpu);
        self
    }

    pub fn memory_mb(mut self, memory_mb: u32) -> Self {
        self.memory_mb = FieldUpdate::Set(memory_mb);
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = FieldUpdate::Set(image.into());
        self
    }

    pub fn status(mut self, status: InstanceStatus) -> Self {
        self.status = FieldUpdate::Set(status);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(cpu) = self.cpu.as_set() {
            require_positive("cpu", *cpu)?;
        }
        if let Some(memory_mb) = self.memory_mb.as_set() {
            require_positive("memory_mb", *memory_mb)?;
        }
        if let Some(status) = self.status.as_set() {
            require_non_empty("status", status.as_str())?;
        }
        Ok(())
    }
}

/// Body of `POST /v1/metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMetadataRequest {
    pub path: String,
    pub value: String,
}

impl CreateMetadataRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("path", &self.path)
    }
}

/// Body of `PATCH /v1/metadata/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMetadataRequest {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub path: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub value: FieldUpdate<String>,
}

impl UpdateMetadataRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = FieldUpdate::Set(path.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = FieldUpdate::Set(value.into());
        self
    }
}

/// Body of `POST /v1/bucket/{bucket_id}/objects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateObjectRequest {
    pub path: String,
    pub content: String,
}

impl CreateObjectRequest {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("path", &self.path)
    }
}

/// Body of `PATCH /v1/bucket/{bucket_id}/objects/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateObjectRequest {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub path: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub content: FieldUpdate<String>,
}

impl UpdateObjectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = FieldUpdate::Set(path.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = FieldUpdate::Set(content.into());
        self
    }
}
