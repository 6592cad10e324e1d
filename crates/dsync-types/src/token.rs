use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::color::Rgba;
use crate::kind::{TokenKind, TypeTag};
use crate::units::{Dimension, Duration};
use crate::value::{TokenValue, Typography};

/// A single design token.
///
/// `value` and `token_type` are optional here only so that a document with a
/// missing field can be loaded and reported on. A token that passes
/// validation always carries both.
///
/// Loading never fails on one bad entry. An entry that is not a token object
/// (a bare string, `null`, or an object with a mistyped field) loads as an
/// empty token whose `malformed` field says why.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Token {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TokenValue>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TypeTag>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields this model does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,

    /// Why the entry could not be read as a token.
    #[serde(skip)]
    pub malformed: Option<String>,
}

#[derive(Deserialize)]
struct TokenFields {
    #[serde(default)]
    value: Option<TokenValue>,
    #[serde(rename = "type", default)]
    token_type: Option<TypeTag>,
    #[serde(default)]
    description: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if !raw.is_object() {
            return Ok(Token::malformed(format!("expected an object, got {}", json_shape(&raw))));
        }
        Ok(match serde_json::from_value::<TokenFields>(raw) {
            Ok(fields) => Token {
                value: fields.value,
                token_type: fields.token_type,
                description: fields.description,
                extra: fields.extra,
                malformed: None,
            },
            Err(e) => Token::malformed(e.to_string()),
        })
    }
}

/// How a JSON value reads in a failure message.
fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Token {
    pub fn new(value: impl Into<TokenValue>, kind: TokenKind) -> Self {
        Self {
            value: Some(value.into()),
            token_type: Some(TypeTag::Known(kind)),
            description: None,
            extra: BTreeMap::new(),
            malformed: None,
        }
    }

    /// A placeholder for an entry that is not a token object.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            malformed: Some(detail.into()),
            ..Self::default()
        }
    }

    /// A typography token built from its composite.
    pub fn typography(typography: Typography) -> Self {
        Self::new(typography.to_value(), TokenKind::Typography)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The recognized kind, if the token has one.
    pub fn kind(&self) -> Option<TokenKind> {
        self.token_type.as_ref().and_then(TypeTag::kind)
    }

    /// Returns `true` when value and type match `other`. Descriptions and
    /// extra fields are not compared.
    pub fn same_content(&self, other: &Token) -> bool {
        self.token_type == other.token_type && self.same_value(other)
    }

    /// Value equality under this token's kind. Colors compare by their 8-bit
    /// channels, so `#1e40af` equals `#1E40AF` and `#fff` equals `#FFFFFF`.
    /// Dimensions and durations compare by amount.
    pub fn same_value(&self, other: &Token) -> bool {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => a == b || self.kind().is_some_and(|kind| equivalent(kind, a, b)),
            (a, b) => a == b,
        }
    }
}

fn equivalent(kind: TokenKind, a: &TokenValue, b: &TokenValue) -> bool {
    match kind {
        TokenKind::Color => match (a.as_str().map(Rgba::parse), b.as_str().map(Rgba::parse)) {
            (Some(Ok(a)), Some(Ok(b))) => a.same_color(&b),
            _ => false,
        },
        TokenKind::Dimension => {
            matches!((Dimension::from_value(a), Dimension::from_value(b)), (Ok(a), Ok(b)) if a == b)
        }
        TokenKind::Duration => {
            matches!((Duration::from_value(a), Duration::from_value(b)), (Ok(a), Ok(b)) if a == b)
        }
        _ => false,
    }
}
