//! The build-tool nested format.
//!
//! Each token becomes `{category: {name: {value, type, description?,
//! attributes}}}`. The `attributes` block is generated metadata for the
//! build tool and is dropped again when the format is read back, so
//! canonical -> build -> canonical is an identity on content.

use std::collections::BTreeMap;

use dsync_types::{OrderedMap, Token, TokenCategory, TokenPath, TokenTree, TokenValue, TypeTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{TransformError, TransformFailures, Transformed};

const ATTRIBUTES: &str = "attributes";

/// Generated per-token metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildAttributes {
    pub category: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub item: String,
}

/// One token in the nested format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildToken {
    pub value: TokenValue,
    #[serde(rename = "type")]
    pub token_type: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attributes: BuildAttributes,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A whole tree in the nested format, in canonical order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTree {
    categories: OrderedMap<OrderedMap<BuildToken>>,
}

impl BuildTree {
    pub fn token_count(&self) -> usize {
        self.categories.values().map(OrderedMap::len).sum()
    }

    pub fn get(&self, path: &TokenPath) -> Option<&BuildToken> {
        self.categories.get(&path.category)?.get(&path.name)
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut BuildToken> {
        self.categories
            .iter_mut()
            .flat_map(|(_, tokens)| tokens.iter_mut().map(|(_, token)| token))
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Re-nest a canonical tree for the build tool. Tokens without a value or
/// type fail at their path.
pub fn to_build_format(tree: &TokenTree) -> Transformed<BuildTree> {
    let mut categories = OrderedMap::new();
    let mut failures = TransformFailures::new();

    for (category, tokens) in tree.categories() {
        let mut nested = OrderedMap::new();
        for (name, token) in tokens.iter() {
            let (Some(value), Some(token_type)) = (&token.value, &token.token_type) else {
                let error = if token.value.is_none() {
                    TransformError::MissingValue
                } else {
                    TransformError::MissingType
                };
                failures.push(TokenPath::new(category, name), error);
                continue;
            };
            nested.insert(
                name,
                BuildToken {
                    value: value.clone(),
                    token_type: token_type.clone(),
                    description: token.description.clone(),
                    attributes: BuildAttributes {
                        category: category.to_string(),
                        token_type: token_type.as_str().to_string(),
                        item: name.to_string(),
                    },
                    extra: token.extra.clone(),
                },
            );
        }
        categories.insert(category, nested);
    }

    Transformed::new(BuildTree { categories }, failures)
}

/// Read a nested-format document back into a canonical tree.
///
/// Only a document that is not an object of objects is an error. Entries
/// nested deeper than `category.token`, or that do not parse as tokens, fail
/// at their path.
pub fn from_build_str(json: &str) -> Result<Transformed<TokenTree>, TransformError> {
    let document: OrderedMap<OrderedMap<Value>> = serde_json::from_str(json)?;
    let mut tree = TokenTree::new();
    let mut failures = TransformFailures::new();

    for (category, entries) in document {
        if tree.category(&category).is_none() {
            tree.insert_category(category.clone(), TokenCategory::new());
        }
        for (name, entry) in entries {
            let path = TokenPath::new(category.clone(), name);
            match read_token(entry) {
                Ok(token) => {
                    tree.insert(&path, token);
                }
                Err(error) => failures.push(path, error),
            }
        }
    }

    debug!(
        tokens = tree.token_count(),
        failures = failures.len(),
        "read build-format document"
    );
    Ok(Transformed::new(tree, failures))
}

fn read_token(entry: Value) -> Result<Token, TransformError> {
    let mut fields = match entry {
        Value::Object(fields) => fields,
        other => {
            return Err(TransformError::MalformedToken(format!(
                "expected an object, got {other}"
            )))
        }
    };
    if !fields.contains_key("value") && fields.values().any(Value::is_object) {
        return Err(TransformError::TooDeep);
    }
    fields.remove(ATTRIBUTES);
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| TransformError::MalformedToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsync_types::{TokenKind, Typography};
    use proptest::prelude::*;
    use serde_json::json;

    const SAMPLE: &str = r##"{
        "colors": {
            "primary": {"value": "#1E40AF", "type": "color", "description": "optional"}
        },
        "typography": {
            "heading": {"value": {"fontFamily": "Inter", "fontSize": 24, "fontWeight": 700}, "type": "typography"}
        }
    }"##;

    #[test]
    fn nested_format_adds_attributes() {
        let tree = TokenTree::from_json_str(SAMPLE).unwrap();
        let build = to_build_format(&tree).strict().unwrap();
        let json: Value = serde_json::from_str(&build.to_json_string(false).unwrap()).unwrap();
        assert_eq!(
            json["colors"]["primary"],
            json!({
                "value": "#1E40AF",
                "type": "color",
                "description": "optional",
                "attributes": {"category": "colors", "type": "color", "item": "primary"}
            })
        );
        assert_eq!(json["typography"]["heading"]["value"]["fontSize"], json!(24));
    }

    #[test]
    fn build_format_round_trips() {
        let tree = TokenTree::from_json_str(SAMPLE).unwrap();
        let text = to_build_format(&tree).strict().unwrap().to_json_string(true).unwrap();
        let back = from_build_str(&text).unwrap().strict().unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.to_json_string(false).unwrap(), tree.to_json_string(false).unwrap());
    }

    #[test]
    fn deeper_nesting_fails_per_path() {
        let doc = r##"{
            "colors": {
                "brand": {"primary": {"value": "#111", "type": "color"}},
                "accent": {"value": "#222", "type": "color"}
            }
        }"##;
        let result = from_build_str(doc).unwrap();
        assert_eq!(result.failures.len(), 1);
        let failure = result.failures.iter().next().unwrap();
        assert_eq!(failure.path, TokenPath::new("colors", "brand"));
        assert!(matches!(failure.error, TransformError::TooDeep));
        assert_eq!(result.output.token_count(), 1);
    }

    #[test]
    fn non_object_document_is_an_error() {
        assert!(matches!(from_build_str("[1, 2]"), Err(TransformError::Document(_))));
        let result = from_build_str(r#"{"colors": {"a": 3}}"#).unwrap();
        assert!(matches!(
            result.failures.iter().next().unwrap().error,
            TransformError::MalformedToken(_)
        ));
    }

    #[test]
    fn incomplete_tokens_are_not_nested() {
        let tree = TokenTree::from_json_str(r##"{"colors": {"a": {"value": "#111"}}}"##).unwrap();
        let result = to_build_format(&tree);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.output.token_count(), 0);
    }

    fn arb_token() -> impl Strategy<Value = Token> {
        prop_oneof![
            any::<[u8; 3]>().prop_map(|[r, g, b]| Token::new(format!("#{r:02X}{g:02X}{b:02X}"), TokenKind::Color)),
            (0u16..512).prop_map(|n| Token::new(format!("{n}px"), TokenKind::Dimension)),
            (1u16..1000).prop_map(|n| Token::new(i64::from(n), TokenKind::FontWeight)),
            ("[A-Z][a-z]{2,8}", 8u8..72, 1u16..10).prop_map(|(family, size, weight)| {
                Token::typography(Typography::new(family, f64::from(size), f64::from(weight * 100)))
            }),
            "[a-z ]{0,12}".prop_map(|d| Token::new("4px", TokenKind::Dimension).with_description(d)),
        ]
    }

    fn arb_tree() -> impl Strategy<Value = TokenTree> {
        let entry = ("[a-z]{1,6}", "[a-z][a-zA-Z0-9]{0,6}", arb_token());
        prop::collection::vec(entry, 0..12).prop_map(|entries| {
            let mut tree = TokenTree::new();
            for (category, name, token) in entries {
                tree.insert(&TokenPath::new(category, name), token);
            }
            tree
        })
    }

    proptest! {
        #[test]
        fn canonical_build_canonical_is_identity(tree in arb_tree()) {
            let text = to_build_format(&tree).strict().unwrap().to_json_string(false).unwrap();
            let back = from_build_str(&text).unwrap().strict().unwrap();
            prop_assert_eq!(back, tree);
        }
    }
}
