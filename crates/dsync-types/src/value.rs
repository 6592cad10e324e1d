//! Token values and the typography composite.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::TypeError;

/// A token value: JSON without `null`.
///
/// Numbers keep their integer-ness (`24` stays `24` when written back) but
/// compare numerically, so `24` equals `24.0`. Composite values compare field
/// by field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TokenValue {
    String(String),
    Number(Number),
    Bool(bool),
    List(Vec<TokenValue>),
    Composite(BTreeMap<String, TokenValue>),
}

impl TokenValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TokenValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&BTreeMap<String, TokenValue>> {
        match self {
            TokenValue::Composite(fields) => Some(fields),
            _ => None,
        }
    }

    /// A numeric value from an `f64`. Integral values are stored as integers.
    pub fn from_f64(value: f64) -> Option<Self> {
        number_from_f64(value).map(TokenValue::Number)
    }

    /// Short name of the value's shape, used in failure messages.
    pub fn shape(&self) -> &'static str {
        match self {
            TokenValue::String(_) => "string",
            TokenValue::Number(_) => "number",
            TokenValue::Bool(_) => "boolean",
            TokenValue::List(_) => "list",
            TokenValue::Composite(_) => "object",
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }
}

/// Convert an `f64` to a JSON number, preferring the integer form when the
/// value is integral. Returns `None` for NaN and infinities.
pub fn number_from_f64(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

impl PartialEq for TokenValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TokenValue::String(a), TokenValue::String(b)) => a == b,
            (TokenValue::Number(a), TokenValue::Number(b)) => a.as_f64() == b.as_f64(),
            (TokenValue::Bool(a), TokenValue::Bool(b)) => a == b,
            (TokenValue::List(a), TokenValue::List(b)) => a == b,
            (TokenValue::Composite(a), TokenValue::Composite(b)) => a == b,
            _ => false,
        }
    }
}

impl TryFrom<Value> for TokenValue {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => {
                return Err(TypeError::InvalidValue(
                    "null is not a token value".into(),
                ))
            }
            Value::Bool(b) => TokenValue::Bool(b),
            Value::Number(n) => TokenValue::Number(n),
            Value::String(s) => TokenValue::String(s),
            Value::Array(items) => TokenValue::List(
                items
                    .into_iter()
                    .map(TokenValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => TokenValue::Composite(
                fields
                    .into_iter()
                    .map(|(k, v)| TokenValue::try_from(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<TokenValue> for Value {
    fn from(value: TokenValue) -> Self {
        match value {
            TokenValue::String(s) => Value::String(s),
            TokenValue::Number(n) => Value::Number(n),
            TokenValue::Bool(b) => Value::Bool(b),
            TokenValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            TokenValue::Composite(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for TokenValue {
    fn from(s: &str) -> Self {
        TokenValue::String(s.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(s: String) -> Self {
        TokenValue::String(s)
    }
}

impl From<i64> for TokenValue {
    fn from(n: i64) -> Self {
        TokenValue::Number(Number::from(n))
    }
}

impl From<Typography> for TokenValue {
    fn from(t: Typography) -> Self {
        t.to_value()
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// The typography composite.
///
/// The design tool has no typography variable, so the transformer splits
/// this into one primitive variable per field and reassembles it on pull.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
}

impl Typography {
    pub const FONT_FAMILY: &'static str = "fontFamily";
    pub const FONT_SIZE: &'static str = "fontSize";
    pub const FONT_WEIGHT: &'static str = "fontWeight";
    pub const LINE_HEIGHT: &'static str = "lineHeight";
    pub const LETTER_SPACING: &'static str = "letterSpacing";

    /// Field names, required ones first.
    pub const FIELDS: [&'static str; 5] = [
        Self::FONT_FAMILY,
        Self::FONT_SIZE,
        Self::FONT_WEIGHT,
        Self::LINE_HEIGHT,
        Self::LETTER_SPACING,
    ];

    pub fn new(font_family: impl Into<String>, font_size: f64, font_weight: f64) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            font_weight,
            line_height: None,
            letter_spacing: None,
        }
    }

    /// Read a typography composite out of a token value.
    ///
    /// Fails on a non-object, a missing required field, a field of the wrong
    /// shape, or a field this model does not know (it could not survive the
    /// trip through the design tool).
    pub fn from_value(value: &TokenValue) -> Result<Self, TypeError> {
        let fields = value.as_composite().ok_or_else(|| {
            TypeError::InvalidValue(format!("typography must be an object, got {}", value.shape()))
        })?;

        if let Some(unknown) = fields.keys().find(|k| !Self::FIELDS.contains(&k.as_str())) {
            return Err(TypeError::InvalidValue(format!(
                "unknown typography field '{unknown}'"
            )));
        }

        let font_family = match fields.get(Self::FONT_FAMILY) {
            Some(TokenValue::String(s)) if !s.is_empty() => s.clone(),
            Some(other) => {
                return Err(TypeError::InvalidValue(format!(
                    "typography fontFamily must be a non-empty string, got {}",
                    other.shape()
                )))
            }
            None => return Err(missing_field(Self::FONT_FAMILY)),
        };

        Ok(Self {
            font_family,
            font_size: required_number(fields, Self::FONT_SIZE)?,
            font_weight: required_number(fields, Self::FONT_WEIGHT)?,
            line_height: optional_number(fields, Self::LINE_HEIGHT)?,
            letter_spacing: optional_number(fields, Self::LETTER_SPACING)?,
        })
    }

    pub fn to_value(&self) -> TokenValue {
        let mut fields = BTreeMap::new();
        fields.insert(
            Self::FONT_FAMILY.to_string(),
            TokenValue::String(self.font_family.clone()),
        );
        let numbers = [
            (Self::FONT_SIZE, Some(self.font_size)),
            (Self::FONT_WEIGHT, Some(self.font_weight)),
            (Self::LINE_HEIGHT, self.line_height),
            (Self::LETTER_SPACING, self.letter_spacing),
        ];
        for (name, number) in numbers {
            if let Some(value) = number.and_then(TokenValue::from_f64) {
                fields.insert(name.to_string(), value);
            }
        }
        TokenValue::Composite(fields)
    }
}

fn missing_field(name: &str) -> TypeError {
    TypeError::InvalidValue(format!("typography is missing '{name}'"))
}

fn required_number(fields: &BTreeMap<String, TokenValue>, name: &str) -> Result<f64, TypeError> {
    optional_number(fields, name)?.ok_or_else(|| missing_field(name))
}

fn optional_number(
    fields: &BTreeMap<String, TokenValue>,
    name: &str,
) -> Result<Option<f64>, TypeError> {
    match fields.get(name) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            TypeError::InvalidValue(format!(
                "typography {name} must be a number, got {}",
                value.shape()
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_numbers_stay_integers() {
        let value: TokenValue = serde_json::from_value(json!(24)).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), "24");
        assert_eq!(TokenValue::from_f64(24.0).unwrap().to_json(), json!(24));
        assert_eq!(TokenValue::from_f64(1.5).unwrap().to_json(), json!(1.5));
    }

    #[test]
    fn numbers_compare_numerically() {
        let int: TokenValue = serde_json::from_value(json!(24)).unwrap();
        let float: TokenValue = serde_json::from_value(json!(24.0)).unwrap();
        assert_eq!(int, float);
    }

    #[test]
    fn nested_null_is_rejected() {
        let result: Result<TokenValue, _> = serde_json::from_value(json!({"a": null}));
        assert!(result.is_err());
    }

    #[test]
    fn composite_equality_is_field_by_field() {
        let a: TokenValue = serde_json::from_value(json!({"fontFamily": "Inter", "fontSize": 24})).unwrap();
        let b: TokenValue = serde_json::from_value(json!({"fontSize": 24.0, "fontFamily": "Inter"})).unwrap();
        let c: TokenValue = serde_json::from_value(json!({"fontSize": 20, "fontFamily": "Inter"})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn typography_from_value() {
        let value: TokenValue = serde_json::from_value(json!({
            "fontFamily": "Inter", "fontSize": 24, "fontWeight": 700, "lineHeight": 1.25
        }))
        .unwrap();
        let t = Typography::from_value(&value).unwrap();
        assert_eq!(t.font_family, "Inter");
        assert_eq!(t.font_size, 24.0);
        assert_eq!(t.font_weight, 700.0);
        assert_eq!(t.line_height, Some(1.25));
        assert_eq!(t.letter_spacing, None);
        assert_eq!(t.to_value(), value);
    }

    #[test]
    fn typography_missing_field() {
        let value: TokenValue = serde_json::from_value(json!({"fontFamily": "Inter", "fontSize": 24})).unwrap();
        let err = Typography::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("fontWeight"));
    }

    #[test]
    fn typography_unknown_field() {
        let value: TokenValue = serde_json::from_value(json!({
            "fontFamily": "Inter", "fontSize": 24, "fontWeight": 700, "textCase": "upper"
        }))
        .unwrap();
        assert!(Typography::from_value(&value).is_err());
    }

    #[test]
    fn typography_wrong_shape() {
        assert!(Typography::from_value(&TokenValue::from("Inter 24")).is_err());
    }
}
