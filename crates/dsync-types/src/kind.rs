use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of token kinds.
///
/// Adding a kind means adding a variant here; validation and the transform
/// tables match on this enum exhaustively, so every consumer is forced to
/// handle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Color,
    Dimension,
    Typography,
    FontFamily,
    FontWeight,
    Duration,
    /// Unitless numeric values such as opacity.
    Number,
}

impl TokenKind {
    /// Every recognized kind, in declaration order.
    pub const ALL: [TokenKind; 7] = [
        TokenKind::Color,
        TokenKind::Dimension,
        TokenKind::Typography,
        TokenKind::FontFamily,
        TokenKind::FontWeight,
        TokenKind::Duration,
        TokenKind::Number,
    ];

    /// The `type` string used in token documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Color => "color",
            TokenKind::Dimension => "dimension",
            TokenKind::Typography => "typography",
            TokenKind::FontFamily => "fontFamily",
            TokenKind::FontWeight => "fontWeight",
            TokenKind::Duration => "duration",
            TokenKind::Number => "number",
        }
    }

    /// Returns `true` for kinds whose value is a composite object.
    pub fn is_composite(&self) -> bool {
        matches!(self, TokenKind::Typography)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A token's `type` field as written in a document.
///
/// Unrecognized strings are kept verbatim instead of failing the load, so
/// the validator can report them alongside every other problem in the file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Known(TokenKind),
    Unrecognized(String),
}

impl TypeTag {
    /// The recognized kind, if any.
    pub fn kind(&self) -> Option<TokenKind> {
        match self {
            TypeTag::Known(kind) => Some(*kind),
            TypeTag::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Known(kind) => kind.as_str(),
            TypeTag::Unrecognized(raw) => raw,
        }
    }
}

impl From<TokenKind> for TypeTag {
    fn from(kind: TokenKind) -> Self {
        TypeTag::Known(kind)
    }
}

impl From<String> for TypeTag {
    fn from(raw: String) -> Self {
        match raw.parse::<TokenKind>() {
            Ok(kind) => TypeTag::Known(kind),
            Err(raw) => TypeTag::Unrecognized(raw),
        }
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Known(kind) => kind.as_str().to_string(),
            TypeTag::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
