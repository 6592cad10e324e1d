use std::collections::HashSet;

use dsync_types::{
    Dimension, Duration, Rgba, Token, TokenKind, TokenPath, TokenTree, TokenValue, TypeTag,
    Typography,
};
use tracing::debug;

use crate::report::{FailureReason, ValidationFailure, ValidationReport};

/// Characters reserved as path separators.
const RESERVED_NAME_CHARS: [char; 2] = ['.', '/'];

/// Token tree validator.
///
/// The set of accepted kinds is an explicit allow-list. It defaults to every
/// [`TokenKind`]; narrowing it makes tokens of the excluded kinds fail with
/// [`FailureReason::KindNotAllowed`].
#[derive(Clone, Debug)]
pub struct Validator {
    allowed: Vec<TokenKind>,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            allowed: TokenKind::ALL.to_vec(),
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator accepting only the given kinds.
    pub fn with_allowed_kinds(kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        Self {
            allowed: kinds.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: TokenKind) -> bool {
        self.allowed.contains(&kind)
    }

    /// Validate a whole tree, collecting every failure.
    pub fn validate(&self, tree: &TokenTree) -> ValidationReport {
        let mut failures = Vec::new();
        let mut seen_categories = HashSet::new();

        for (category, tokens) in tree.categories() {
            let category_path = TokenPath::category(category);
            check_name(category, &category_path, &mut failures);
            if !seen_categories.insert(category) {
                failures.push(ValidationFailure::new(
                    category_path.clone(),
                    FailureReason::DuplicateCategory,
                ));
            }
            if let Some(detail) = tokens.malformed() {
                failures.push(ValidationFailure::new(
                    category_path,
                    FailureReason::Malformed(detail.to_string()),
                ));
                continue;
            }

            let mut seen_names = HashSet::new();
            for (name, token) in tokens.iter() {
                let path = TokenPath::new(category, name);
                check_name(name, &path, &mut failures);
                if !seen_names.insert(name) {
                    failures.push(ValidationFailure::new(
                        path.clone(),
                        FailureReason::DuplicateName,
                    ));
                }
                self.check_token(&path, token, &mut failures);
            }
        }

        debug!(
            categories = tree.category_count(),
            tokens = tree.token_count(),
            failures = failures.len(),
            "validated token tree"
        );
        ValidationReport::new(failures)
    }

    /// Check one token's fields and value shape.
    pub fn check_token(&self, path: &TokenPath, token: &Token, out: &mut Vec<ValidationFailure>) {
        let mut fail = |reason| out.push(ValidationFailure::new(path.clone(), reason));

        if let Some(detail) = &token.malformed {
            fail(FailureReason::Malformed(detail.clone()));
            return;
        }
        if token.value.is_none() && token.token_type.is_none() && has_nested_tokens(token) {
            fail(FailureReason::NestedGroup);
            return;
        }
        if token.value.is_none() {
            fail(FailureReason::MissingValue);
        }

        let kind = match &token.token_type {
            None => {
                fail(FailureReason::MissingType);
                return;
            }
            Some(TypeTag::Unrecognized(raw)) => {
                fail(FailureReason::UnrecognizedType(raw.clone()));
                return;
            }
            Some(TypeTag::Known(kind)) if !self.allows(*kind) => {
                fail(FailureReason::KindNotAllowed(*kind));
                return;
            }
            Some(TypeTag::Known(kind)) => *kind,
        };

        if let Some(value) = &token.value {
            if let Err(detail) = check_value(kind, value) {
                fail(FailureReason::InvalidValue { kind, detail });
            }
        }
    }
}

/// Validate with the default allow-list.
pub fn validate(tree: &TokenTree) -> ValidationReport {
    Validator::default().validate(tree)
}

fn check_name(name: &str, path: &TokenPath, out: &mut Vec<ValidationFailure>) {
    if name.trim().is_empty() {
        out.push(ValidationFailure::new(path.clone(), FailureReason::EmptyName));
    } else if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        out.push(ValidationFailure::new(path.clone(), FailureReason::InvalidName(c)));
    }
}

/// A token without value or type whose unknown fields are objects is really
/// a group of tokens one level too deep.
fn has_nested_tokens(token: &Token) -> bool {
    !token.extra.is_empty() && token.extra.values().any(serde_json::Value::is_object)
}

/// Check that `value` has the shape `kind` requires.
pub fn check_value(kind: TokenKind, value: &TokenValue) -> Result<(), String> {
    match kind {
        TokenKind::Color => match value {
            TokenValue::String(s) => Rgba::parse(s).map(|_| ()).map_err(|e| e.to_string()),
            other => Err(format!("expected a color string, got {}", other.shape())),
        },
        TokenKind::Dimension => Dimension::from_value(value)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        TokenKind::Duration => Duration::from_value(value)
            .map(|_| ())
            .map_err(|e| e.to_string()),
        TokenKind::FontFamily => match value {
            TokenValue::String(s) if !s.trim().is_empty() => Ok(()),
            TokenValue::String(_) => Err("font family must not be empty".into()),
            other => Err(format!("expected a string, got {}", other.shape())),
        },
        TokenKind::FontWeight => value
            .as_f64()
            .ok_or_else(|| format!("expected a number, got {}", value.shape()))
            .and_then(check_weight),
        TokenKind::Number => value
            .as_f64()
            .map(|_| ())
            .ok_or_else(|| format!("expected a number, got {}", value.shape())),
        TokenKind::Typography => {
            let typography = Typography::from_value(value).map_err(|e| e.to_string())?;
            if typography.font_size <= 0.0 {
                return Err("typography fontSize must be positive".into());
            }
            check_weight(typography.font_weight)
        }
    }
}

fn check_weight(weight: f64) -> Result<(), String> {
    if (1.0..=1000.0).contains(&weight) {
        Ok(())
    } else {
        Err(format!("font weight {weight} is outside 1..=1000"))
    }
}
