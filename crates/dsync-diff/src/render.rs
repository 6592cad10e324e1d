//! Plain-text rendering of a diff, used for dry-run previews.

use std::fmt::Write;

use dsync_types::{Token, TokenValue};

use crate::token_diff::{Change, TokenDiff};
use crate::value_diff::{diff_values, DiffLine};

fn describe(token: &Token) -> String {
    let value = token
        .value
        .as_ref()
        .map_or_else(|| "<no value>".to_string(), TokenValue::to_string);
    match &token.token_type {
        Some(tag) => format!("{value} ({tag})"),
        None => value,
    }
}

/// Render one line per entry: `+` added, `-` removed, `~` changed.
/// Composite value changes are followed by an indented line diff.
pub fn render_text(diff: &TokenDiff) -> String {
    let mut out = String::new();
    if diff.is_empty() {
        out.push_str("no changes\n");
        return out;
    }
    for entry in diff {
        let _ = match &entry.change {
            Change::Added { new } => writeln!(out, "+ {} = {}", entry.path, describe(new)),
            Change::Removed { old } => writeln!(out, "- {} = {}", entry.path, describe(old)),
            Change::Changed { old, new } => {
                let composite = [old, new]
                    .iter()
                    .any(|t| matches!(t.value, Some(TokenValue::Composite(_))));
                match (&old.value, &new.value) {
                    (Some(a), Some(b)) if composite => {
                        let _ = writeln!(out, "~ {}", entry.path);
                        for line in diff_values(a, b).lines {
                            let _ = match line {
                                DiffLine::Context(text) => writeln!(out, "    {text}"),
                                DiffLine::Added(text) => writeln!(out, "  + {text}"),
                                DiffLine::Removed(text) => writeln!(out, "  - {text}"),
                            };
                        }
                        Ok(())
                    }
                    _ => writeln!(
                        out,
                        "~ {}: {} -> {}",
                        entry.path,
                        describe(old),
                        describe(new)
                    ),
                }
            }
        };
    }
    let _ = writeln!(
        out,
        "{} added, {} removed, {} changed",
        diff.additions(),
        diff.removals(),
        diff.modifications()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_diff::diff;
    use dsync_types::TokenTree;

    #[test]
    fn render_changed_scalar() {
        let base = TokenTree::from_json_str(r#"{"spacing":{"sm":{"value":"8px","type":"dimension"}}}"#).unwrap();
        let proposed = TokenTree::from_json_str(r#"{"spacing":{"sm":{"value":"10px","type":"dimension"}}}"#).unwrap();
        assert_eq!(
            render_text(&diff(&base, &proposed)),
            "~ spacing.sm: 8px (dimension) -> 10px (dimension)\n0 added, 0 removed, 1 changed\n"
        );
    }

    #[test]
    fn render_empty() {
        let t = TokenTree::new();
        assert_eq!(render_text(&diff(&t, &t)), "no changes\n");
    }

    #[test]
    fn render_composite_change_as_line_diff() {
        let base = TokenTree::from_json_str(
            r#"{"typography":{"h":{"value":{"fontFamily":"Inter","fontSize":24,"fontWeight":700},"type":"typography"}}}"#,
        )
        .unwrap();
        let proposed = TokenTree::from_json_str(
            r#"{"typography":{"h":{"value":{"fontFamily":"Inter","fontSize":32,"fontWeight":700},"type":"typography"}}}"#,
        )
        .unwrap();
        let text = render_text(&diff(&base, &proposed));
        assert!(text.starts_with("~ typography.h\n"));
        assert!(text.contains("  -   \"fontSize\": 24,\n"));
        assert!(text.contains("  +   \"fontSize\": 32,\n"));
    }
}
