//! Value conversion between remote primitives and canonical token values.

use dsync_types::{
    number_from_f64, Dimension, Duration, LengthUnit, Rgba, TokenKind, TokenValue, Typography,
};
use serde_json::{json, Value};

use crate::error::TransformError;

fn invalid(kind: TokenKind, detail: impl Into<String>) -> TransformError {
    TransformError::InvalidValue {
        kind,
        detail: detail.into(),
    }
}

fn remote_number(kind: TokenKind, raw: &Value) -> Result<f64, TransformError> {
    raw.as_f64()
        .ok_or_else(|| invalid(kind, format!("expected a remote number, got {raw}")))
}

fn json_number(kind: TokenKind, value: f64) -> Result<Value, TransformError> {
    number_from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| invalid(kind, format!("{value} is not a finite number")))
}

fn canonical_number(kind: TokenKind, value: f64) -> Result<TokenValue, TransformError> {
    TokenValue::from_f64(value).ok_or_else(|| invalid(kind, format!("{value} is not a finite number")))
}

/// Convert a remote primitive value to the canonical value for `kind`.
pub fn canonical_value(kind: TokenKind, raw: &Value) -> Result<TokenValue, TransformError> {
    match kind {
        TokenKind::Color => {
            let channel = |name: &str| raw.get(name).and_then(Value::as_f64);
            match (channel("r"), channel("g"), channel("b")) {
                (Some(r), Some(g), Some(b)) => {
                    let a = channel("a").unwrap_or(1.0);
                    Ok(TokenValue::String(Rgba::new(r, g, b, a).to_css()))
                }
                _ => Err(invalid(kind, format!("expected an {{r,g,b,a}} color, got {raw}"))),
            }
        }
        TokenKind::Dimension => {
            Ok(TokenValue::String(Dimension::px(remote_number(kind, raw)?).to_string()))
        }
        TokenKind::Duration => Ok(TokenValue::String(
            Duration::from_millis(remote_number(kind, raw)?).to_string(),
        )),
        TokenKind::FontWeight | TokenKind::Number => {
            canonical_number(kind, remote_number(kind, raw)?)
        }
        TokenKind::FontFamily => raw
            .as_str()
            .map(TokenValue::from)
            .ok_or_else(|| invalid(kind, format!("expected a remote string, got {raw}"))),
        TokenKind::Typography => Err(invalid(kind, "typography has no single remote value")),
    }
}

/// Convert a canonical value of `kind` to its remote primitive.
pub fn remote_value(kind: TokenKind, value: &TokenValue) -> Result<Value, TransformError> {
    match kind {
        TokenKind::Color => {
            let text = value
                .as_str()
                .ok_or_else(|| invalid(kind, format!("expected a string, got {}", value.shape())))?;
            let c = Rgba::parse(text).map_err(|e| invalid(kind, e.to_string()))?;
            Ok(json!({"r": c.r, "g": c.g, "b": c.b, "a": c.a}))
        }
        TokenKind::Dimension => {
            let d = Dimension::from_value(value).map_err(|e| invalid(kind, e.to_string()))?;
            if d.unit != LengthUnit::Px {
                return Err(TransformError::UnsupportedUnit(d.unit.as_str().to_string()));
            }
            json_number(kind, d.amount)
        }
        TokenKind::Duration => {
            let d = Duration::from_value(value).map_err(|e| invalid(kind, e.to_string()))?;
            json_number(kind, d.millis)
        }
        TokenKind::FontWeight | TokenKind::Number => {
            let n = value
                .as_f64()
                .ok_or_else(|| invalid(kind, format!("expected a number, got {}", value.shape())))?;
            json_number(kind, n)
        }
        TokenKind::FontFamily => value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| invalid(kind, format!("expected a string, got {}", value.shape()))),
        TokenKind::Typography => Err(invalid(kind, "typography has no single remote value")),
    }
}

/// Remote values of each typography field, in [`Typography::FIELDS`] order.
/// Optional fields that are absent are skipped.
pub fn typography_fields(value: &TokenValue) -> Result<Vec<(&'static str, Value)>, TransformError> {
    let typography =
        Typography::from_value(value).map_err(|e| invalid(TokenKind::Typography, e.to_string()))?;
    let composite = typography.to_value();
    let Some(fields) = composite.as_composite() else {
        return Ok(Vec::new());
    };
    Ok(Typography::FIELDS
        .iter()
        .filter_map(|name| fields.get(*name).map(|v| (*name, v.to_json())))
        .collect())
}

/// Rebuild a typography value from remote field values.
pub fn typography_from_fields<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> Result<TokenValue, TransformError> {
    let mut composite = std::collections::BTreeMap::new();
    for (name, raw) in fields {
        let value = if name == Typography::FONT_FAMILY {
            raw.as_str().map(TokenValue::from)
        } else {
            raw.as_f64().and_then(TokenValue::from_f64)
        };
        let value = value.ok_or_else(|| {
            invalid(TokenKind::Typography, format!("field '{name}' has remote value {raw}"))
        })?;
        composite.insert(name.to_string(), value);
    }
    let composite = TokenValue::Composite(composite);
    Typography::from_value(&composite)
        .map(|t| t.to_value())
        .map_err(|e| invalid(TokenKind::Typography, e.to_string()))
}
