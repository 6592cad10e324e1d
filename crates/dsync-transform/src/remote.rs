//! Design-tool variable payloads.
//!
//! These mirror the `meta` object of the design tool's local-variables
//! response. Ids are opaque strings; maps are keyed by id.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Alias marker inside `valuesByMode`.
pub const VARIABLE_ALIAS: &str = "VARIABLE_ALIAS";

/// All local variable collections and variables of one file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariables {
    #[serde(default)]
    pub variable_collections: BTreeMap<String, RemoteCollection>,
    #[serde(default)]
    pub variables: BTreeMap<String, RemoteVariable>,
}

impl RemoteVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn collection_named(&self, name: &str) -> Option<&RemoteCollection> {
        self.variable_collections.values().find(|c| c.name == name)
    }

    /// Variables of a collection: those listed in `variableIds` in listed
    /// order, then any others that point at the collection, by id.
    pub fn variables_in<'a>(
        &'a self,
        collection: &'a RemoteCollection,
    ) -> impl Iterator<Item = &'a RemoteVariable> + 'a {
        let listed = collection
            .variable_ids
            .iter()
            .filter_map(|id| self.variables.get(id));
        let unlisted = self.variables.values().filter(|v| {
            v.variable_collection_id == collection.id && !collection.variable_ids.contains(&v.id)
        });
        listed.chain(unlisted)
    }

    /// Insert a collection, keyed by its id.
    pub fn add_collection(&mut self, collection: RemoteCollection) {
        self.variable_collections
            .insert(collection.id.clone(), collection);
    }

    /// Insert a variable and list it in its collection, if present.
    pub fn add_variable(&mut self, variable: RemoteVariable) {
        if let Some(collection) = self
            .variable_collections
            .get_mut(&variable.variable_collection_id)
        {
            if !collection.variable_ids.contains(&variable.id) {
                collection.variable_ids.push(variable.id.clone());
            }
        }
        self.variables.insert(variable.id.clone(), variable);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modes: Vec<RemoteMode>,
    #[serde(default)]
    pub default_mode_id: String,
    #[serde(default)]
    pub variable_ids: Vec<String>,
}

impl RemoteCollection {
    /// A collection with a single mode named `Default`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let mode_id = format!("{id}:default");
        Self {
            name: name.into(),
            modes: vec![RemoteMode {
                mode_id: mode_id.clone(),
                name: "Default".into(),
            }],
            default_mode_id: mode_id,
            variable_ids: Vec::new(),
            id,
        }
    }

    /// Mode id for `name`, or the default mode when `name` is `None`.
    pub fn mode_id(&self, name: Option<&str>) -> Option<&str> {
        match name {
            None => Some(self.default_mode_id.as_str()),
            Some(name) => self
                .modes
                .iter()
                .find(|m| m.name == name)
                .map(|m| m.mode_id.as_str()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMode {
    pub mode_id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariable {
    pub id: String,
    pub name: String,
    pub variable_collection_id: String,
    pub resolved_type: ResolvedType,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, Value>,
}

impl RemoteVariable {
    /// The alias target id, if the value for `mode_id` is an alias.
    pub fn alias_in(&self, mode_id: &str) -> Option<&str> {
        let value = self.values_by_mode.get(mode_id)?;
        if value.get("type").and_then(Value::as_str) == Some(VARIABLE_ALIAS) {
            value.get("id").and_then(Value::as_str)
        } else {
            None
        }
    }
}

/// Primitive type of a remote variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Color,
    Float,
    String,
    Boolean,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolvedType::Color => "COLOR",
            ResolvedType::Float => "FLOAT",
            ResolvedType::String => "STRING",
            ResolvedType::Boolean => "BOOLEAN",
            ResolvedType::Unknown => "UNKNOWN",
        })
    }
}
