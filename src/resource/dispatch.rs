//! Resource Dispatch
//!
//! Maps `(resource type, verb, target, JSON params)` onto the typed
//! [`NahClient`] operations and hands the result back as JSON. This is the
//! seam an orchestration adapter or the command line calls through.

use super::registry::{get_resource, ResourceDef};
use crate::nah::{
    CreateInstanceRequest, CreateMetadataRequest, CreateNamedRequest, CreateObjectRequest, Error,
    NahClient, Result, UpdateBucketRequest, UpdateInstanceRequest, UpdateMetadataRequest,
    UpdateObjectRequest, UpdateProjectRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle operation on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Get,
    Update,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Which entity a call addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Entity id; unused for create
    pub id: Option<String>,
    /// Owning entity id for scoped resources (the bucket of an object)
    pub parent: Option<String>,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("an id is required".to_string()))
    }
}

/// Execute a lifecycle operation on a resource type
///
/// `params` is the create or update payload as JSON; it is ignored for get and
/// delete. Delete returns `Value::Null`.
pub async fn execute(
    client: &NahClient,
    resource_key: &str,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    let Some(resource_def) = get_resource(resource_key) else {
        return Err(Error::InvalidRequest(format!("Unknown resource: {}", resource_key)));
    };

    tracing::info!(
        "execute: resource={}, verb={}, id={}",
        resource_key,
        verb,
        target.id.as_deref().unwrap_or("-")
    );

    match resource_key {
        "nah_project" => execute_project(client, resource_def, verb, target, params).await,
        "nah_instance" => execute_instance(client, resource_def, verb, target, params).await,
        "nah_metadata" => execute_metadata(client, resource_def, verb, target, params).await,
        "nah_bucket" => execute_bucket(client, resource_def, verb, target, params).await,
        "nah_object" => execute_object(client, resource_def, verb, target, params).await,
        _ => Err(Error::InvalidRequest(format!("Unknown resource: {}", resource_key))),
    }
}

// =============================================================================
// Projects / Buckets
// =============================================================================

async fn execute_project(
    client: &NahClient,
    def: &ResourceDef,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    match verb {
        Verb::Create => {
            let req: CreateNamedRequest = create_params(def, params, None)?;
            to_json(client.create_project(&req.name).await?)
        }
        Verb::Get => to_json(client.get_project(target.require_id()?).await?),
        Verb::Update => {
            let req: UpdateProjectRequest = update_params(def, params, None)?;
            to_json(client.update_project(target.require_id()?, &req).await?)
        }
        Verb::Delete => {
            client.delete_project(target.require_id()?).await?;
            Ok(Value::Null)
        }
    }
}

async fn execute_bucket(
    client: &NahClient,
    def: &ResourceDef,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    match verb {
        Verb::Create => {
            let req: CreateNamedRequest = create_params(def, params, None)?;
            to_json(client.create_bucket(&req.name).await?)
        }
        Verb::Get => to_json(client.get_bucket(target.require_id()?).await?),
        Verb::Update => {
            let req: UpdateBucketRequest = update_params(def, params, None)?;
            to_json(client.update_bucket(target.require_id()?, &req).await?)
        }
        Verb::Delete => {
            client.delete_bucket(target.require_id()?).await?;
            Ok(Value::Null)
        }
    }
}

// =============================================================================
// Instances
// =============================================================================

async fn execute_instance(
    client: &NahClient,
    def: &ResourceDef,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    match verb {
        Verb::Create => {
            let req: CreateInstanceRequest =
                create_params(def, params, target.parent.as_deref())?;
            to_json(client.create_instance(&req).await?)
        }
        Verb::Get => to_json(client.get_instance(target.require_id()?).await?),
        Verb::Update => {
            let req: UpdateInstanceRequest = update_params(def, params, None)?;
            to_json(client.update_instance(target.require_id()?, &req).await?)
        }
        Verb::Delete => {
            client.delete_instance(target.require_id()?).await?;
            Ok(Value::Null)
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

async fn execute_metadata(
    client: &NahClient,
    def: &ResourceDef,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    match verb {
        Verb::Create => {
            let req: CreateMetadataRequest = create_params(def, params, None)?;
            to_json(client.create_metadata(&req.path, &req.value).await?)
        }
        Verb::Get => to_json(client.get_metadata(target.require_id()?).await?),
        Verb::Update => {
            let req: UpdateMetadataRequest = update_params(def, params, None)?;
            to_json(client.update_metadata(target.require_id()?, &req).await?)
        }
        Verb::Delete => {
            client.delete_metadata(target.require_id()?).await?;
            Ok(Value::Null)
        }
    }
}

// =============================================================================
// Objects
// =============================================================================

async fn execute_object(
    client: &NahClient,
    def: &ResourceDef,
    verb: Verb,
    target: &Target,
    params: &Value,
) -> Result<Value> {
    let bucket_id = target
        .parent
        .clone()
        .or_else(|| get_param_str(params, "bucket_id"))
        .ok_or_else(|| Error::InvalidRequest("objects require a bucket id".to_string()))?;

    match verb {
        Verb::Create => {
            let req: CreateObjectRequest = create_params(def, params, Some(bucket_id.as_str()))?;
            to_json(client.create_object(&bucket_id, &req).await?)
        }
        Verb::Get => to_json(client.get_object(&bucket_id, target.require_id()?).await?),
        Verb::Update => {
            let req: UpdateObjectRequest = update_params(def, params, Some(bucket_id.as_str()))?;
            to_json(client.update_object(&bucket_id, target.require_id()?, &req).await?)
        }
        Verb::Delete => {
            client.delete_object(&bucket_id, target.require_id()?).await?;
            Ok(Value::Null)
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Get a string parameter from params
fn get_param_str(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn params_object(params: &Value) -> Result<Map<String, Value>> {
    match params {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        other => Err(Error::InvalidRequest(format!(
            "parameters must be a JSON object, got {}",
            other
        ))),
    }
}

/// Build a create payload: fill in the parent id and declared defaults,
/// check required fields, then decode into the typed request
fn create_params<T: DeserializeOwned>(
    def: &ResourceDef,
    params: &Value,
    parent: Option<&str>,
) -> Result<T> {
    let mut map = params_object(params)?;
    check_declared(def, &map)?;

    if let (Some(field), Some(parent)) = (&def.parent_field, parent) {
        if let Some(given) = map.get(field).filter(|v| !v.is_null()) {
            if given.as_str() != Some(parent) {
                return Err(Error::InvalidRequest(format!(
                    "{}.{} is {} but the call is addressed to {:?}",
                    def.cli_name, field, given, parent
                )));
            }
        }
        map.insert(field.clone(), Value::String(parent.to_string()));
    }
    def.apply_defaults(&mut map);

    let missing = def.missing_required(&map);
    if !missing.is_empty() {
        return Err(Error::InvalidRequest(format!(
            "{} is missing required fields: {}",
            def.cli_name,
            missing.join(", ")
        )));
    }

    decode_params(def, Value::Object(map))
}

/// Build an update payload, refusing fields that are computed or can only
/// change by replacement. A parent field that merely repeats the parent the
/// call is addressed to is dropped.
fn update_params<T: DeserializeOwned>(
    def: &ResourceDef,
    params: &Value,
    addressed_parent: Option<&str>,
) -> Result<T> {
    let mut map = params_object(params)?;
    check_declared(def, &map)?;

    if let (Some(field), Some(parent)) = (&def.parent_field, addressed_parent) {
        if map.get(field).and_then(|v| v.as_str()) == Some(parent) {
            map.remove(field);
        }
    }

    let changed: Vec<&String> = map.keys().collect();
    if def.requires_replace(&changed) {
        return Err(Error::InvalidRequest(format!(
            "{} cannot be updated in place; changing {:?} requires replacement",
            def.cli_name, changed
        )));
    }

    decode_params(def, Value::Object(map))
}

/// Refuse keys the resource does not declare, so a misspelled field fails
/// instead of being dropped from the request, and keys the server computes
fn check_declared(def: &ResourceDef, map: &Map<String, Value>) -> Result<()> {
    let unknown: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|key| def.field(key).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(Error::InvalidRequest(format!(
            "{} has no field(s): {}",
            def.cli_name,
            unknown.join(", ")
        )));
    }

    if let Some(field) = map
        .keys()
        .find(|name| def.field(name).is_some_and(|f| f.computed))
    {
        return Err(Error::InvalidRequest(format!(
            "{}.{} is computed by the server",
            def.cli_name, field
        )));
    }
    Ok(())
}

fn decode_params<T: DeserializeOwned>(def: &ResourceDef, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| {
        Error::InvalidRequest(format!("invalid {} parameters: {}", def.cli_name, e))
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::registry::get_resource;
    use serde_json::json;

    #[test]
    fn test_instance_create_params_fill_parent_and_defaults() {
        let def = get_resource("nah_instance").unwrap();
        let req: CreateInstanceRequest = create_params(
            def,
            &json!({"name": "web", "image": "debian-12"}),
            Some("p1"),
        )
        .unwrap();

        assert_eq!(req.project_id, "p1");
        assert_eq!(req.cpu, 1);
        assert_eq!(req.memory_mb, 512);
        assert_eq!(req.status, Some(crate::nah::InstanceStatus::Running));
    }

    #[test]
    fn test_create_params_report_missing_fields() {
        let def = get_resource("nah_metadata").unwrap();
        let err = create_params::<CreateMetadataRequest>(def, &json!({"path": "a/b"}), None)
            .unwrap_err();
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn test_update_params_drop_addressed_bucket() {
        let def = get_resource("nah_object").unwrap();
        let req: UpdateObjectRequest =
            update_params(def, &json!({"bucket_id": "b1", "path": "/b.txt"}), Some("b1"))
                .unwrap();
        assert_eq!(req.path.as_set().map(String::as_str), Some("/b.txt"));
        assert!(req.content.is_unchanged());
    }

    #[test]
    fn test_update_params_reject_bucket_move() {
        let def = get_resource("nah_object").unwrap();
        let err = update_params::<UpdateObjectRequest>(
            def,
            &json!({"bucket_id": "b2", "path": "/b.txt"}),
            Some("b1"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires replacement"));
    }

    #[test]
    fn test_update_params_reject_project_move() {
        let def = get_resource("nah_instance").unwrap();
        let err = update_params::<UpdateInstanceRequest>(
            def,
            &json!({"project_id": "p2", "cpu": 2}),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_update_params_reject_computed_fields() {
        let def = get_resource("nah_project").unwrap();
        let err =
            update_params::<UpdateProjectRequest>(def, &json!({"id": "x"}), None).unwrap_err();
        assert!(err.to_string().contains("computed"));
    }

    #[test]
    fn test_undeclared_fields_are_rejected() {
        let def = get_resource("nah_project").unwrap();
        let err = update_params::<UpdateProjectRequest>(def, &json!({"nmae": "after"}), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("nmae"));

        let def = get_resource("nah_metadata").unwrap();
        let err = create_params::<CreateMetadataRequest>(
            def,
            &json!({"path": "a/b", "value": "c", "vaule": "d"}),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("vaule"));
    }

    #[test]
    fn test_create_params_reject_computed_fields() {
        let def = get_resource("nah_bucket").unwrap();
        let err = create_params::<CreateNamedRequest>(def, &json!({"id": "b9", "name": "x"}), None)
            .unwrap_err();
        assert!(err.to_string().contains("computed"));
    }

    #[test]
    fn test_create_params_reject_conflicting_parent() {
        let def = get_resource("nah_instance").unwrap();
        let err = create_params::<CreateInstanceRequest>(
            def,
            &json!({"project_id": "p2", "name": "web", "image": "debian-12"}),
            Some("p1"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let req: CreateInstanceRequest = create_params(
            def,
            &json!({"project_id": "p1", "name": "web", "image": "debian-12"}),
            Some("p1"),
        )
        .unwrap();
        assert_eq!(req.project_id, "p1");
    }

    #[test]
    fn test_non_object_params_are_rejected() {
        let def = get_resource("nah_bucket").unwrap();
        assert!(create_params::<CreateNamedRequest>(def, &json!([1, 2]), None).is_err());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::Delete.to_string(), "delete");
    }
}
