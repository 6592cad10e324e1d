//! Platform-specific value preparation for the build tool.

use std::collections::BTreeMap;

use dsync_types::{color::round_to, Platform, Rgba, TokenKind, TokenValue};

use crate::build::BuildTree;

/// Rewrite color values into the form a platform's generator expects.
///
/// - `ios`: `{r, g, b, a}` component objects rounded to three decimals.
/// - `android`: `#AARRGGBB`, so opaque `#RRGGBB` gains an `FF` prefix.
///
/// Other platforms, and values that do not parse as colors, pass through.
pub fn prepare_for_platform(mut tree: BuildTree, platform: Platform) -> BuildTree {
    let rewrite: fn(&Rgba) -> TokenValue = match platform {
        Platform::Ios => ios_components,
        Platform::Android => android_argb,
        _ => return tree,
    };
    for token in tree.tokens_mut() {
        if token.token_type.kind() != Some(TokenKind::Color) {
            continue;
        }
        let parsed = token.value.as_str().and_then(|s| Rgba::parse(s).ok());
        if let Some(color) = parsed {
            token.value = rewrite(&color);
        }
    }
    tree
}

fn ios_components(color: &Rgba) -> TokenValue {
    let components: BTreeMap<String, TokenValue> = [
        ("r", color.r),
        ("g", color.g),
        ("b", color.b),
        ("a", color.a),
    ]
    .into_iter()
    .filter_map(|(name, channel)| {
        TokenValue::from_f64(round_to(channel, 3)).map(|v| (name.to_string(), v))
    })
    .collect();
    TokenValue::Composite(components)
}

fn android_argb(color: &Rgba) -> TokenValue {
    TokenValue::String(format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        Rgba::channel(color.a),
        Rgba::channel(color.r),
        Rgba::channel(color.g),
        Rgba::channel(color.b)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::to_build_format;
    use dsync_types::{Token, TokenPath, TokenTree};
    use serde_json::json;

    fn build() -> BuildTree {
        let mut tree = TokenTree::new();
        tree.insert(&TokenPath::new("colors", "primary"), Token::new("#1E40AF", TokenKind::Color));
        tree.insert(&TokenPath::new("colors", "overlay"), Token::new("rgba(0, 0, 0, 0.5)", TokenKind::Color));
        tree.insert(&TokenPath::new("spacing", "sm"), Token::new("8px", TokenKind::Dimension));
        to_build_format(&tree).strict().unwrap()
    }

    fn value(tree: &BuildTree, category: &str, name: &str) -> serde_json::Value {
        tree.get(&TokenPath::new(category, name)).unwrap().value.to_json()
    }

    #[test]
    fn ios_colors_become_components() {
        let tree = prepare_for_platform(build(), Platform::Ios);
        assert_eq!(
            value(&tree, "colors", "primary"),
            json!({"r": 0.118, "g": 0.251, "b": 0.686, "a": 1})
        );
        assert_eq!(value(&tree, "spacing", "sm"), json!("8px"));
    }

    #[test]
    fn android_colors_gain_alpha_prefix() {
        let tree = prepare_for_platform(build(), Platform::Android);
        assert_eq!(value(&tree, "colors", "primary"), json!("#FF1E40AF"));
        assert_eq!(value(&tree, "colors", "overlay"), json!("#80000000"));
    }

    #[test]
    fn web_platforms_pass_through() {
        for platform in [Platform::Css, Platform::Scss, Platform::Js, Platform::Json] {
            assert_eq!(prepare_for_platform(build(), platform), build());
        }
    }
}
