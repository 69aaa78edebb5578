//! Resource Registry - Load resource definitions from JSON
//!
//! The five NahCloud resource types are described in an embedded JSON file:
//! which collection they live in, which field scopes them to a parent, and
//! how each declared field behaves (required, computed, default, forces
//! replacement).

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/nah.json")];

/// Declared field of a resource type
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Set by the server, never sent by the caller
    #[serde(default)]
    pub computed: bool,
    /// Changing this field means destroy-and-recreate, not PATCH
    #[serde(default)]
    pub force_new: bool,
    /// Value applied on create when the caller leaves the field out
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Short name used on the command line (`project`, `object`, ...)
    pub cli_name: String,
    pub collection: String,
    /// Field naming the owning entity, for scoped resources
    #[serde(default)]
    pub parent_field: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ResourceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when changing any of `changed` cannot be done in place
    pub fn requires_replace<S: AsRef<str>>(&self, changed: &[S]) -> bool {
        changed
            .iter()
            .any(|name| self.field(name.as_ref()).is_some_and(|f| f.force_new))
    }

    /// Fill in declared defaults for fields missing from a create payload
    pub fn apply_defaults(&self, params: &mut Map<String, Value>) {
        for field in &self.fields {
            if let Some(default) = &field.default {
                params
                    .entry(field.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
    }

    /// Required fields absent from a create payload
    pub fn missing_required(&self, params: &Map<String, Value>) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required && !params.get(&f.name).is_some_and(|v| !v.is_null()))
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by type name (`nah_project`, ...)
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Resolve a command-line name or a full type name to its type name
pub fn resolve_resource_key(name: &str) -> Option<&'static str> {
    get_registry()
        .resources
        .iter()
        .find(|(key, def)| key.as_str() == name || def.cli_name == name)
        .map(|(key, _)| key.as_str())
}

/// Get all resource type names, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
