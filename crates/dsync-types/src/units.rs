//! Dimension and duration values with units.

use std::fmt;

use crate::error::TypeError;
use crate::value::TokenValue;

/// Length units accepted in dimension tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Rem,
    Em,
    Percent,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Rem => "rem",
            LengthUnit::Em => "em",
            LengthUnit::Percent => "%",
        }
    }
}

/// A length such as `8px` or `1.5rem`. Bare numbers are pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimension {
    pub amount: f64,
    pub unit: LengthUnit,
}

impl Dimension {
    pub fn px(amount: f64) -> Self {
        Self {
            amount,
            unit: LengthUnit::Px,
        }
    }

    pub fn from_value(value: &TokenValue) -> Result<Self, TypeError> {
        match value {
            TokenValue::Number(n) => n
                .as_f64()
                .map(Self::px)
                .ok_or_else(|| TypeError::InvalidValue(format!("'{n}' is not a dimension"))),
            TokenValue::String(s) => Self::parse(s),
            other => Err(TypeError::InvalidValue(format!(
                "dimension must be a number or string, got {}",
                other.shape()
            ))),
        }
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        // `rem` before `em`, since the former ends with the latter.
        let units = [
            LengthUnit::Px,
            LengthUnit::Rem,
            LengthUnit::Em,
            LengthUnit::Percent,
        ];
        for unit in units {
            if let Some(number) = s.strip_suffix(unit.as_str()) {
                return parse_amount(number)
                    .map(|amount| Self { amount, unit })
                    .ok_or_else(|| invalid_dimension(s));
            }
        }
        parse_amount(s).map(Self::px).ok_or_else(|| invalid_dimension(s))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_amount(self.amount), self.unit.as_str())
    }
}

/// A duration, stored in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Duration {
    pub millis: f64,
}

impl Duration {
    pub fn from_millis(millis: f64) -> Self {
        Self { millis }
    }

    pub fn from_value(value: &TokenValue) -> Result<Self, TypeError> {
        match value {
            TokenValue::Number(n) => n
                .as_f64()
                .map(Self::from_millis)
                .ok_or_else(|| TypeError::InvalidValue(format!("'{n}' is not a duration"))),
            TokenValue::String(s) => Self::parse(s),
            other => Err(TypeError::InvalidValue(format!(
                "duration must be a number or string, got {}",
                other.shape()
            ))),
        }
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        let invalid = || TypeError::InvalidValue(format!("'{s}' is not a duration"));
        if let Some(ms) = s.strip_suffix("ms") {
            parse_amount(ms).map(Self::from_millis).ok_or_else(invalid)
        } else if let Some(secs) = s.strip_suffix('s') {
            parse_amount(secs)
                .map(|secs| Self::from_millis(secs * 1000.0))
                .ok_or_else(invalid)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", format_amount(self.millis))
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{amount}")
    }
}

fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn invalid_dimension(s: &str) -> TypeError {
    TypeError::InvalidValue(format!("'{s}' is not a dimension"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dimensions() {
        assert_eq!(Dimension::parse("8px").unwrap(), Dimension::px(8.0));
        let rem = Dimension::parse("1.5rem").unwrap();
        assert_eq!(rem.unit, LengthUnit::Rem);
        assert_eq!(rem.amount, 1.5);
        assert_eq!(Dimension::parse("2em").unwrap().unit, LengthUnit::Em);
        assert_eq!(Dimension::parse("50%").unwrap().unit, LengthUnit::Percent);
        assert_eq!(Dimension::parse("16").unwrap(), Dimension::px(16.0));
        assert!(Dimension::parse("px").is_err());
        assert!(Dimension::parse("wide").is_err());
    }

    #[test]
    fn dimension_display() {
        assert_eq!(Dimension::px(16.0).to_string(), "16px");
        assert_eq!(Dimension::px(24.5).to_string(), "24.5px");
    }

    #[test]
    fn parse_durations() {
        assert_eq!(Duration::parse("200ms").unwrap().millis, 200.0);
        assert_eq!(Duration::parse("0.25s").unwrap().millis, 250.0);
        assert!(Duration::parse("200").is_err());
        assert_eq!(Duration::from_millis(150.0).to_string(), "150ms");
    }

    #[test]
    fn bare_number_values() {
        assert_eq!(Dimension::from_value(&TokenValue::from(4)).unwrap(), Dimension::px(4.0));
        assert_eq!(Duration::from_value(&TokenValue::from(300)).unwrap().millis, 300.0);
        assert!(Dimension::from_value(&TokenValue::Bool(true)).is_err());
    }
}
