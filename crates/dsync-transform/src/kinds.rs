//! The remote type table.
//!
//! The design tool only knows primitive resolved types. The kind of a token
//! is recovered from the resolved type plus the variable's scopes; the
//! inverse picks the resolved type and default scopes for each kind.

use dsync_types::{TokenKind, Typography};

use crate::error::TransformError;
use crate::remote::ResolvedType;

pub const ALL_SCOPES: &str = "ALL_SCOPES";
pub const OPACITY: &str = "OPACITY";
pub const FONT_FAMILY: &str = "FONT_FAMILY";
pub const FONT_WEIGHT: &str = "FONT_WEIGHT";
pub const FONT_SIZE: &str = "FONT_SIZE";
pub const LINE_HEIGHT: &str = "LINE_HEIGHT";
pub const LETTER_SPACING: &str = "LETTER_SPACING";

/// FLOAT scopes that denote a length.
pub const DIMENSION_SCOPES: [&str; 10] = [
    "GAP",
    "WIDTH_HEIGHT",
    "CORNER_RADIUS",
    FONT_SIZE,
    LINE_HEIGHT,
    LETTER_SPACING,
    "STROKE_FLOAT",
    "EFFECT_FLOAT",
    "PARAGRAPH_SPACING",
    "PARAGRAPH_INDENT",
];

/// Map a remote resolved type and scopes onto a token kind.
///
/// FLOAT variables without scopes are durations: the design tool has no
/// scope for time values.
pub fn remote_kind(
    resolved_type: ResolvedType,
    scopes: &[String],
) -> Result<TokenKind, TransformError> {
    let has = |scope: &str| scopes.iter().any(|s| s == scope);
    match resolved_type {
        ResolvedType::Color => Ok(TokenKind::Color),
        ResolvedType::Float if has(FONT_WEIGHT) => Ok(TokenKind::FontWeight),
        ResolvedType::Float if DIMENSION_SCOPES.iter().any(|&s| has(s)) => {
            Ok(TokenKind::Dimension)
        }
        ResolvedType::Float if has(ALL_SCOPES) || has(OPACITY) => Ok(TokenKind::Number),
        ResolvedType::Float if scopes.is_empty() => Ok(TokenKind::Duration),
        ResolvedType::String if has(FONT_FAMILY) => Ok(TokenKind::FontFamily),
        _ => Err(TransformError::UnmappedRemoteType {
            resolved_type: resolved_type.to_string(),
            scopes: if scopes.is_empty() {
                "none".into()
            } else {
                scopes.join(", ")
            },
        }),
    }
}

/// Resolved type and scopes a token kind is sent with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteShape {
    pub resolved_type: ResolvedType,
    pub scopes: Vec<String>,
}

impl RemoteShape {
    fn new(resolved_type: ResolvedType, scopes: &[&str]) -> Self {
        Self {
            resolved_type,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Default shape for a primitive kind. Typography has none: it is sent
    /// as one variable per field, see [`RemoteShape::for_typography_field`].
    pub fn for_kind(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Color => Self::new(ResolvedType::Color, &[ALL_SCOPES]),
            TokenKind::Dimension => Self::new(ResolvedType::Float, &["WIDTH_HEIGHT", "GAP"]),
            TokenKind::FontFamily => Self::new(ResolvedType::String, &[FONT_FAMILY]),
            TokenKind::FontWeight => Self::new(ResolvedType::Float, &[FONT_WEIGHT]),
            TokenKind::Duration => Self::new(ResolvedType::Float, &[]),
            TokenKind::Number => Self::new(ResolvedType::Float, &[ALL_SCOPES]),
            TokenKind::Typography => return None,
        })
    }

    /// Shape of one decomposed typography field.
    pub fn for_typography_field(field: &str) -> Option<Self> {
        Some(match field {
            Typography::FONT_FAMILY => Self::new(ResolvedType::String, &[FONT_FAMILY]),
            Typography::FONT_SIZE => Self::new(ResolvedType::Float, &[FONT_SIZE]),
            Typography::FONT_WEIGHT => Self::new(ResolvedType::Float, &[FONT_WEIGHT]),
            Typography::LINE_HEIGHT => Self::new(ResolvedType::Float, &[LINE_HEIGHT]),
            Typography::LETTER_SPACING => Self::new(ResolvedType::Float, &[LETTER_SPACING]),
            _ => return None,
        })
    }
}
