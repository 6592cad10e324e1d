//! Color value parsing and formatting.
//!
//! Accepted notations: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
//! `rgba(r, g, b, a)` with 0-255 channels and a 0-1 alpha.

use std::fmt;

use crate::error::TypeError;

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any accepted notation.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| invalid(s));
        }
        let lower = s.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| invalid(s))?;
        parse_functional(args).ok_or_else(|| invalid(s))
    }

    /// 8-bit channel value, rounded.
    pub fn channel(value: f64) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Returns `true` when both colors have the same 8-bit channels.
    pub fn same_color(&self, other: &Rgba) -> bool {
        let channels = |c: &Rgba| [c.r, c.g, c.b, c.a].map(Self::channel);
        channels(self) == channels(other)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when translucent.
    pub fn to_hex(&self) -> String {
        let mut out = format!(
            "#{:02X}{:02X}{:02X}",
            Self::channel(self.r),
            Self::channel(self.g),
            Self::channel(self.b)
        );
        if !self.is_opaque() {
            out.push_str(&format!("{:02X}", Self::channel(self.a)));
        }
        out
    }

    /// `#RRGGBB` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            self.to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                Self::channel(self.r),
                Self::channel(self.g),
                Self::channel(self.b),
                round_to(self.a, 3)
            )
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn invalid(s: &str) -> TypeError {
    TypeError::InvalidValue(format!("'{s}' is not a recognized color"))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let alpha = if expanded.len() == 8 { byte(6)? } else { 255 };
    Some(Rgba::new(
        f64::from(byte(0)?) / 255.0,
        f64::from(byte(2)?) / 255.0,
        f64::from(byte(4)?) / 255.0,
        f64::from(alpha) / 255.0,
    ))
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<f64> = args
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<_>>()?;
    let (rgb, a) = match parts.as_slice() {
        [r, g, b] => ([*r, *g, *b], 1.0),
        [r, g, b, a] => ([*r, *g, *b], *a),
        _ => return None,
    };
    if rgb.iter().any(|c| !(0.0..=255.0).contains(c)) || !(0.0..=1.0).contains(&a) {
        return None;
    }
    Some(Rgba::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0, a))
}
