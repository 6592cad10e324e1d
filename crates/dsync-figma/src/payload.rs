//! Request and response bodies of the variables endpoints.

use dsync_sync::RemotePush;
use dsync_transform::design_tool::TEMP_ID_PREFIX;
use dsync_transform::{RemoteVariables, ResolvedType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /v1/files/:key/variables/local`
#[derive(Debug, Deserialize)]
pub struct LocalVariablesResponse {
    #[serde(default)]
    pub meta: RemoteVariables,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Update,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionChange {
    pub action: Action,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_mode_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableChange {
    pub action: Action,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_type: Option<ResolvedType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeValue {
    pub variable_id: String,
    pub mode_id: String,
    pub value: Value,
}

/// `POST /v1/files/:key/variables`
///
/// Entities whose id carries the temporary prefix are created; the rest are
/// updated. Created entities refer to each other by their temporary ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variable_collections: Vec<CollectionChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variable_mode_values: Vec<ModeValue>,
}

fn is_temporary(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

impl VariablesUpdate {
    pub fn from_push(push: &RemotePush) -> Self {
        let mut update = Self::default();

        for collection in push.upserts.variable_collections.values() {
            if is_temporary(&collection.id) {
                update.variable_collections.push(CollectionChange {
                    action: Action::Create,
                    id: collection.id.clone(),
                    name: collection.name.clone(),
                    initial_mode_id: Some(collection.default_mode_id.clone()),
                });
            }
        }

        for variable in push.upserts.variables.values() {
            let change = if is_temporary(&variable.id) {
                VariableChange {
                    action: Action::Create,
                    id: variable.id.clone(),
                    name: Some(variable.name.clone()),
                    variable_collection_id: Some(variable.variable_collection_id.clone()),
                    resolved_type: Some(variable.resolved_type),
                    scopes: Some(variable.scopes.clone()),
                    description: Some(variable.description.clone()),
                }
            } else {
                VariableChange {
                    action: Action::Update,
                    id: variable.id.clone(),
                    name: Some(variable.name.clone()),
                    variable_collection_id: None,
                    resolved_type: None,
                    scopes: Some(variable.scopes.clone()),
                    description: Some(variable.description.clone()),
                }
            };
            update.variables.push(change);

            for (mode_id, value) in &variable.values_by_mode {
                update.variable_mode_values.push(ModeValue {
                    variable_id: variable.id.clone(),
                    mode_id: mode_id.clone(),
                    value: value.clone(),
                });
            }
        }

        for id in &push.deletes {
            update.variables.push(VariableChange {
                action: Action::Delete,
                id: id.clone(),
                name: None,
                variable_collection_id: None,
                resolved_type: None,
                scopes: None,
                description: None,
            });
        }

        update
    }

    /// Variables created, updated, or deleted.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsync_transform::to_design_tool;
    use dsync_types::{Token, TokenKind, TokenPath, TokenTree};
    use serde_json::json;

    fn push_for(tree: &TokenTree, snapshot: Option<&RemoteVariables>) -> RemotePush {
        RemotePush {
            upserts: to_design_tool(tree, snapshot).output,
            deletes: vec![],
        }
    }

    #[test]
    fn new_tokens_are_created_with_temporary_ids() {
        let mut tree = TokenTree::new();
        tree.insert(&TokenPath::new("colors", "primary"), Token::new("#1E40AF", TokenKind::Color));
        let body = serde_json::to_value(VariablesUpdate::from_push(&push_for(&tree, None))).unwrap();

        assert_eq!(
            body["variableCollections"],
            json!([{"action": "CREATE", "id": "tmp:colors", "name": "colors", "initialModeId": "tmp:colors:default"}])
        );
        assert_eq!(body["variables"][0]["action"], "CREATE");
        assert_eq!(body["variables"][0]["id"], "tmp:colors/primary");
        assert_eq!(body["variables"][0]["resolvedType"], "COLOR");
        assert_eq!(body["variableModeValues"][0]["modeId"], "tmp:colors:default");
        assert!(body["variableModeValues"][0]["value"]["r"].is_number());
    }

    #[test]
    fn existing_variables_are_updated() {
        let raw: RemoteVariables = serde_json::from_value(json!({
            "variableCollections": {
                "VC:1": {"id": "VC:1", "name": "spacing", "modes": [{"modeId": "1:0", "name": "Default"}],
                         "defaultModeId": "1:0", "variableIds": ["V:1"]}
            },
            "variables": {
                "V:1": {"id": "V:1", "name": "sm", "variableCollectionId": "VC:1", "resolvedType": "FLOAT",
                        "scopes": ["GAP"], "valuesByMode": {"1:0": 8}}
            }
        }))
        .unwrap();
        let mut tree = TokenTree::new();
        tree.insert(&TokenPath::new("spacing", "sm"), Token::new("10px", TokenKind::Dimension));
        let update = VariablesUpdate::from_push(&push_for(&tree, Some(&raw)));

        assert!(update.variable_collections.is_empty());
        assert_eq!(update.variables[0].action, Action::Update);
        assert_eq!(update.variables[0].id, "V:1");
        assert_eq!(update.variables[0].resolved_type, None);
        assert_eq!(update.variable_mode_values[0].value, json!(10));
    }

    #[test]
    fn deletions_carry_only_ids() {
        let push = RemotePush {
            upserts: RemoteVariables::new(),
            deletes: vec!["V:9".into()],
        };
        let body = serde_json::to_value(VariablesUpdate::from_push(&push)).unwrap();
        assert_eq!(body, json!({"variables": [{"action": "DELETE", "id": "V:9"}]}));
    }
}
