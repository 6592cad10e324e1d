//! Design tool variables to canonical tokens, and back.

use std::collections::{HashMap, HashSet};

use dsync_types::{Token, TokenCategory, TokenKind, TokenPath, TokenTree, TypeTag, Typography};
use serde_json::Value;
use tracing::debug;

use crate::error::{TransformError, TransformFailures, Transformed};
use crate::kinds::{remote_kind, RemoteShape};
use crate::naming::{camel_case, typography_part, typography_variable_name, GROUP_SEPARATOR};
use crate::remote::{RemoteCollection, RemoteVariable, RemoteVariables};
use crate::values::{canonical_value, remote_value, typography_fields, typography_from_fields};

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_DEPTH: usize = 16;

/// Prefix of ids minted for entities that do not exist remotely yet.
pub const TEMP_ID_PREFIX: &str = "tmp:";

/// Options for reading remote variables.
#[derive(Clone, Debug, Default)]
pub struct PullSettings {
    /// Mode name to read values from. `None` reads each collection's default
    /// mode.
    pub mode: Option<String>,
}

/// Convert remote variables into a canonical tree.
///
/// Each collection becomes a category named after it and each variable a
/// token with a camelCase name. A `/` group whose members are all
/// typography fields is recomposed into one typography token.
pub fn to_canonical(raw: &RemoteVariables, settings: &PullSettings) -> Transformed<TokenTree> {
    let mut tree = TokenTree::new();
    let mut failures = TransformFailures::new();

    for variable in raw.variables.values() {
        if !raw
            .variable_collections
            .contains_key(&variable.variable_collection_id)
        {
            failures.push(
                TokenPath::new(&variable.variable_collection_id, camel_case(&variable.name)),
                TransformError::UnknownCollection(variable.variable_collection_id.clone()),
            );
        }
    }

    for collection in raw.variable_collections.values() {
        let category = collection.name.as_str();
        if tree.category(category).is_none() {
            tree.insert_category(category, TokenCategory::new());
        }
        let Some(mode_id) = collection.mode_id(settings.mode.as_deref()) else {
            let mode = settings.mode.clone().unwrap_or_default();
            failures.push(TokenPath::category(category), TransformError::UnknownMode(mode));
            continue;
        };
        read_collection(raw, collection, mode_id, &mut tree, &mut failures);
    }

    debug!(
        collections = raw.variable_collections.len(),
        variables = raw.variables.len(),
        tokens = tree.token_count(),
        failures = failures.len(),
        "converted remote variables to tokens"
    );
    Transformed::new(tree, failures)
}

fn read_collection(
    raw: &RemoteVariables,
    collection: &RemoteCollection,
    mode_id: &str,
    tree: &mut TokenTree,
    failures: &mut TransformFailures,
) {
    let category = collection.name.as_str();
    let variables: Vec<&RemoteVariable> = raw.variables_in(collection).collect();

    let mut groups: HashMap<&str, Vec<&RemoteVariable>> = HashMap::new();
    for variable in variables.iter().copied() {
        if let Some((prefix, _)) = variable.name.rsplit_once(GROUP_SEPARATOR) {
            groups.entry(prefix).or_default().push(variable);
        }
    }
    let is_typography_group = |prefix: &str| {
        let members = &groups[prefix];
        let fields: HashSet<&str> = members
            .iter()
            .filter_map(|v| typography_part(&v.name).map(|(_, field)| field))
            .collect();
        fields.len() == members.len()
    };

    let mut emitted_groups = HashSet::new();
    let mut seen_names: HashMap<String, &str> = HashMap::new();

    for variable in variables {
        let group = typography_part(&variable.name)
            .map(|(prefix, _)| prefix)
            .filter(|prefix| is_typography_group(prefix));

        let (name, result) = match group {
            Some(prefix) => {
                if !emitted_groups.insert(prefix) {
                    continue;
                }
                (camel_case(prefix), typography_token(raw, &groups[prefix], mode_id))
            }
            None => (camel_case(&variable.name), variable_token(raw, variable, mode_id)),
        };

        let path = TokenPath::new(category, name.clone());
        if name.is_empty() {
            failures.push(
                path,
                TransformError::MalformedToken(format!(
                    "remote name '{}' has no letters or digits",
                    variable.name
                )),
            );
            continue;
        }
        if let Some(previous) = seen_names.insert(name, &variable.name) {
            failures.push(path, TransformError::NameCollision(previous.to_string()));
            continue;
        }
        match result {
            Ok(token) => {
                tree.insert(&path, token);
            }
            Err(error) => failures.push(path, error),
        }
    }
}

fn variable_token(
    raw: &RemoteVariables,
    variable: &RemoteVariable,
    mode_id: &str,
) -> Result<Token, TransformError> {
    let kind = remote_kind(variable.resolved_type, &variable.scopes)?;
    let value = canonical_value(kind, resolve_value(raw, variable, mode_id)?)?;
    let token = Token::new(value, kind);
    Ok(match variable.description.as_str() {
        "" => token,
        description => token.with_description(description),
    })
}

fn typography_token(
    raw: &RemoteVariables,
    members: &[&RemoteVariable],
    mode_id: &str,
) -> Result<Token, TransformError> {
    let mut fields = Vec::with_capacity(members.len());
    for member in members {
        if let Some((_, field)) = typography_part(&member.name) {
            fields.push((field, resolve_value(raw, member, mode_id)?));
        }
    }

    let missing: Vec<&str> = [
        Typography::FONT_FAMILY,
        Typography::FONT_SIZE,
        Typography::FONT_WEIGHT,
    ]
    .into_iter()
    .filter(|required| !fields.iter().any(|(field, _)| field == required))
    .collect();
    if !missing.is_empty() {
        return Err(TransformError::IncompleteTypography(missing.join(", ")));
    }

    let token = Token::new(typography_from_fields(fields)?, TokenKind::Typography);
    Ok(
        match members.iter().find(|m| !m.description.is_empty()) {
            Some(member) => token.with_description(member.description.clone()),
            None => token,
        },
    )
}

/// The value of `variable` in `mode_id`, following aliases. An alias into
/// another collection reads that collection's default mode.
fn resolve_value<'a>(
    raw: &'a RemoteVariables,
    variable: &'a RemoteVariable,
    mode_id: &'a str,
) -> Result<&'a Value, TransformError> {
    let mut current = variable;
    let mut mode = mode_id;
    for _ in 0..MAX_ALIAS_DEPTH {
        let value = current
            .values_by_mode
            .get(mode)
            .ok_or_else(|| TransformError::MissingModeValue(mode.to_string()))?;
        let Some(target_id) = current.alias_in(mode) else {
            return Ok(value);
        };
        let target = raw
            .variables
            .get(target_id)
            .ok_or_else(|| TransformError::UnresolvedAlias(target_id.to_string()))?;
        if target.variable_collection_id != current.variable_collection_id {
            mode = raw
                .variable_collections
                .get(&target.variable_collection_id)
                .map(|c| c.default_mode_id.as_str())
                .ok_or_else(|| TransformError::UnresolvedAlias(target_id.to_string()))?;
        }
        current = target;
    }
    Err(TransformError::UnresolvedAlias(variable.id.clone()))
}

/// Snapshot variables of one collection, keyed by the token name they map to.
/// Typography fields are also keyed as `<token>/<field>`.
struct SnapshotIndex<'a> {
    by_key: HashMap<String, &'a RemoteVariable>,
}

impl<'a> SnapshotIndex<'a> {
    fn new(snapshot: &'a RemoteVariables, collection: Option<&'a RemoteCollection>) -> Self {
        let mut by_key = HashMap::new();
        if let Some(collection) = collection {
            for variable in snapshot.variables_in(collection) {
                by_key.entry(camel_case(&variable.name)).or_insert(variable);
                if let Some((group, field)) = typography_part(&variable.name) {
                    by_key
                        .entry(typography_variable_name(&camel_case(group), field))
                        .or_insert(variable);
                }
            }
        }
        Self { by_key }
    }

    /// The variable a token named `name` maps to, matching the way a pull
    /// names it.
    fn token(&self, name: &str) -> Option<&'a RemoteVariable> {
        self.by_key.get(&camel_case(name)).copied()
    }

    /// The variable carrying one typography field of the token `name`.
    fn field(&self, name: &str, field: &str) -> Option<&'a RemoteVariable> {
        self.by_key
            .get(&typography_variable_name(&camel_case(name), field))
            .copied()
    }
}

/// A local tree re-keyed under the token names a pull produces.
#[derive(Debug, Default)]
pub struct PulledNames {
    pub tree: TokenTree,
    /// Local spelling of every token whose pulled name differs, keyed by the
    /// pulled path.
    pub local: HashMap<TokenPath, String>,
}

impl PulledNames {
    /// The local name of the token at the pulled `path`.
    pub fn local_name<'a>(&'a self, path: &'a TokenPath) -> &'a str {
        self.local.get(path).map_or(path.name.as_str(), String::as_str)
    }
}

/// Re-key `tree` with the camelCase names a pull gives remote variables, so
/// a local tree compares equal to the same tokens read back from the remote.
///
/// A name with no letters or digits, or one that normalizes onto an earlier
/// token of the same category, fails for that path.
pub fn pulled_names(tree: &TokenTree) -> Transformed<PulledNames> {
    let mut out = PulledNames::default();
    let mut failures = TransformFailures::new();

    for (category, tokens) in tree.categories() {
        if out.tree.category(category).is_none() {
            out.tree.insert_category(category, TokenCategory::new());
        }
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (name, token) in tokens.iter() {
            let pulled = camel_case(name);
            if pulled.is_empty() {
                failures.push(
                    TokenPath::new(category, name),
                    TransformError::MalformedToken(format!("name '{name}' has no letters or digits")),
                );
                continue;
            }
            if let Some(previous) = seen.insert(pulled.clone(), name) {
                failures.push(
                    TokenPath::new(category, name),
                    TransformError::NameCollision(previous.to_string()),
                );
                continue;
            }
            let path = TokenPath::new(category, pulled);
            if path.name != name {
                out.local.insert(path.clone(), name.to_string());
            }
            out.tree.insert(&path, token.clone());
        }
    }
    Transformed::new(out, failures)
}

/// Convert a canonical tree into remote variables.
///
/// With a `snapshot`, collections and variables that already exist remotely
/// keep their ids and remote names. Everything else gets a temporary id,
/// `tmp:<category>` for collections and `tmp:<category>/<name>` for
/// variables. Typography tokens become one variable per field.
pub fn to_design_tool(
    tree: &TokenTree,
    snapshot: Option<&RemoteVariables>,
) -> Transformed<RemoteVariables> {
    let empty = RemoteVariables::new();
    let snapshot = snapshot.unwrap_or(&empty);
    let mut out = RemoteVariables::new();
    let mut failures = TransformFailures::new();

    for (category, tokens) in tree.categories() {
        let existing = snapshot.collection_named(category);
        let collection = match existing {
            Some(c) => RemoteCollection {
                variable_ids: Vec::new(),
                ..c.clone()
            },
            None => RemoteCollection::new(format!("{TEMP_ID_PREFIX}{category}"), category),
        };
        let index = SnapshotIndex::new(snapshot, existing);
        let target = Target {
            category,
            collection_id: collection.id.clone(),
            mode_id: collection.default_mode_id.clone(),
        };
        out.add_collection(collection);

        for (name, token) in tokens.iter() {
            match target.variables_for(name, token, &index) {
                Ok(variables) => variables.into_iter().for_each(|v| out.add_variable(v)),
                Err(error) => failures.push(TokenPath::new(category, name), error),
            }
        }
    }

    debug!(
        collections = out.variable_collections.len(),
        variables = out.variables.len(),
        failures = failures.len(),
        "converted tokens to remote variables"
    );
    Transformed::new(out, failures)
}

struct Target<'a> {
    category: &'a str,
    collection_id: String,
    mode_id: String,
}

impl Target<'_> {
    fn variables_for(
        &self,
        name: &str,
        token: &Token,
        index: &SnapshotIndex<'_>,
    ) -> Result<Vec<RemoteVariable>, TransformError> {
        let value = token.value.as_ref().ok_or(TransformError::MissingValue)?;
        let kind = match &token.token_type {
            None => return Err(TransformError::MissingType),
            Some(TypeTag::Unrecognized(raw)) => {
                return Err(TransformError::UnrecognizedType(raw.clone()))
            }
            Some(TypeTag::Known(kind)) => *kind,
        };

        let Some(shape) = RemoteShape::for_kind(kind) else {
            let mut variables = Vec::new();
            for (field, raw) in typography_fields(value)? {
                let key = typography_variable_name(name, field);
                let Some(shape) = RemoteShape::for_typography_field(field) else {
                    continue;
                };
                let existing = index
                    .field(name, field)
                    .filter(|v| v.resolved_type == shape.resolved_type);
                variables.push(self.variable(&key, existing, shape, raw, token));
            }
            return Ok(variables);
        };

        let raw = remote_value(kind, value)?;
        let existing = index
            .token(name)
            .filter(|v| remote_kind(v.resolved_type, &v.scopes).ok() == Some(kind));
        Ok(vec![self.variable(name, existing, shape, raw, token)])
    }

    fn variable(
        &self,
        key: &str,
        existing: Option<&RemoteVariable>,
        shape: RemoteShape,
        raw: Value,
        token: &Token,
    ) -> RemoteVariable {
        let description = token
            .description
            .clone()
            .or_else(|| existing.map(|v| v.description.clone()))
            .unwrap_or_default();
        let (id, name, scopes) = match existing {
            Some(v) => (v.id.clone(), v.name.clone(), v.scopes.clone()),
            None => (
                format!("{TEMP_ID_PREFIX}{}/{key}", self.category),
                key.to_string(),
                shape.scopes,
            ),
        };
        RemoteVariable {
            id,
            name,
            variable_collection_id: self.collection_id.clone(),
            resolved_type: shape.resolved_type,
            scopes,
            description,
            values_by_mode: [(self.mode_id.clone(), raw)].into_iter().collect(),
        }
    }
}

/// Ids of the snapshot variables that carry the token at `path`. A
/// typography token maps to one id per field.
pub fn remote_ids_for(snapshot: &RemoteVariables, path: &TokenPath) -> Vec<String> {
    let index = SnapshotIndex::new(snapshot, snapshot.collection_named(&path.category));
    let variables = std::iter::once(index.token(&path.name)).chain(
        Typography::FIELDS
            .iter()
            .map(|field| index.field(&path.name, field)),
    );
    let mut ids: Vec<String> = Vec::new();
    for variable in variables.flatten() {
        if !ids.contains(&variable.id) {
            ids.push(variable.id.clone());
        }
    }
    ids
}
