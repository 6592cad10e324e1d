//! The two levels of the canonical model: categories and trees.

use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::TypeResult;
use crate::ordered::OrderedMap;
use crate::path::TokenPath;
use crate::token::Token;

/// A named bucket of tokens, such as `colors` or `spacing`.
///
/// A category entry that is not an object loads as an empty category with
/// `malformed` set, so the rest of the document can still be validated.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenCategory {
    tokens: OrderedMap<Token>,
    #[serde(skip)]
    malformed: Option<String>,
}

impl TokenCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Why the entry could not be read as a category, if it could not.
    pub fn malformed(&self) -> Option<&str> {
        self.malformed.as_deref()
    }

    fn not_an_object(shape: &str) -> Self {
        Self {
            tokens: OrderedMap::new(),
            malformed: Some(format!("expected an object, got {shape}")),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.tokens.get(name)
    }

    /// Insert or replace a token. Replacement keeps the token's position.
    pub fn insert(&mut self, name: impl Into<String>, token: Token) -> Option<Token> {
        self.tokens.insert(name, token)
    }

    pub fn remove(&mut self, name: &str) -> Option<Token> {
        self.tokens.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.tokens.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token names that appear more than once in the loaded document.
    pub fn duplicate_names(&self) -> Vec<&str> {
        self.tokens.duplicate_keys()
    }
}

impl FromIterator<(String, Token)> for TokenCategory {
    fn from_iter<I: IntoIterator<Item = (String, Token)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
            malformed: None,
        }
    }
}

struct CategoryVisitor;

impl<'de> Visitor<'de> for CategoryVisitor {
    type Value = TokenCategory;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a category object")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        Ok(TokenCategory {
            tokens: OrderedMap::deserialize(MapAccessDeserializer::new(access))?,
            malformed: None,
        })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        while access.next_element::<IgnoredAny>()?.is_some() {}
        Ok(TokenCategory::not_an_object("an array"))
    }

    fn visit_str<E: serde::de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("a string"))
    }

    fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("a boolean"))
    }

    fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("a number"))
    }

    fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("a number"))
    }

    fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("a number"))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("null"))
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(TokenCategory::not_an_object("null"))
    }
}

impl<'de> Deserialize<'de> for TokenCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CategoryVisitor)
    }
}

impl IntoIterator for TokenCategory {
    type Item = (String, Token);
    type IntoIter = std::vec::IntoIter<(String, Token)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// The canonical token tree: category name to [`TokenCategory`].
///
/// Trees are always fully materialized. Equality ignores ordering at both
/// levels; serialization preserves it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenTree {
    categories: OrderedMap<TokenCategory>,
}

impl TokenTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a canonical token document, keeping document order and
    /// repeated keys.
    ///
    /// Only a document that is not a JSON object fails. Categories and
    /// tokens of the wrong shape load as malformed entries for the
    /// validator to report.
    pub fn from_json_str(json: &str) -> TypeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a tree from an already-parsed value.
    ///
    /// `serde_json::Value` objects are sorted by key and hold each key once,
    /// so neither document order nor repeated names survive. Use
    /// [`from_json_str`](Self::from_json_str) when either matters.
    pub fn from_json_value(value: Value) -> TypeResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to a JSON document, preserving category and token order.
    pub fn to_json_string(&self, pretty: bool) -> TypeResult<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    pub fn to_json_value(&self) -> TypeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn category(&self, name: &str) -> Option<&TokenCategory> {
        self.categories.get(name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut TokenCategory> {
        self.categories.get_mut(name)
    }

    /// Insert or replace a whole category.
    pub fn insert_category(
        &mut self,
        name: impl Into<String>,
        category: TokenCategory,
    ) -> Option<TokenCategory> {
        self.categories.insert(name, category)
    }

    /// Insert or replace one token, appending its category if it is new.
    pub fn insert(&mut self, path: &TokenPath, token: Token) -> Option<Token> {
        self.categories
            .get_or_insert_with(&path.category, TokenCategory::new)
            .insert(path.name.clone(), token)
    }

    pub fn get(&self, path: &TokenPath) -> Option<&Token> {
        self.categories.get(&path.category)?.get(&path.name)
    }

    /// Remove one token. An emptied category is kept.
    pub fn remove(&mut self, path: &TokenPath) -> Option<Token> {
        self.categories.get_mut(&path.category)?.remove(&path.name)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &TokenCategory)> {
        self.categories.iter()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys()
    }

    /// Every token with its path, in tree order.
    pub fn tokens(&self) -> impl Iterator<Item = (TokenPath, &Token)> {
        self.categories.iter().flat_map(|(category, tokens)| {
            tokens
                .iter()
                .map(move |(name, token)| (TokenPath::new(category, name), token))
        })
    }

    pub fn paths(&self) -> impl Iterator<Item = TokenPath> + '_ {
        self.tokens().map(|(path, _)| path)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn token_count(&self) -> usize {
        self.categories.values().map(TokenCategory::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }

    /// Category names that appear more than once in the loaded document.
    pub fn duplicate_categories(&self) -> Vec<&str> {
        self.categories.duplicate_keys()
    }

    /// Drop categories with no tokens.
    pub fn without_empty_categories(self) -> Self {
        Self {
            categories: self
                .categories
                .into_iter()
                .filter(|(_, c)| !c.is_empty())
                .collect(),
        }
    }
}

impl FromIterator<(String, TokenCategory)> for TokenTree {
    fn from_iter<I: IntoIterator<Item = (String, TokenCategory)>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TokenTree {
    type Item = (String, TokenCategory);
    type IntoIter = std::vec::IntoIter<(String, TokenCategory)>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.into_iter()
    }
}
