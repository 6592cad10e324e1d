//! Tree-level diff: compare two token trees path by path.

use std::collections::HashSet;

use dsync_types::{Token, TokenPath, TokenTree};
use serde::Serialize;

/// The result of comparing two token trees. Immutable once produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenDiff {
    entries: Vec<DiffEntry>,
}

impl TokenDiff {
    /// Returns `true` if the trees are equal in every value and type.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn get(&self, path: &TokenPath) -> Option<&DiffEntry> {
        self.entries.iter().find(|e| &e.path == path)
    }

    /// Number of added paths.
    pub fn additions(&self) -> usize {
        self.count(|c| matches!(c, Change::Added { .. }))
    }

    /// Number of removed paths.
    pub fn removals(&self) -> usize {
        self.count(|c| matches!(c, Change::Removed { .. }))
    }

    /// Number of changed paths.
    pub fn modifications(&self) -> usize {
        self.count(|c| matches!(c, Change::Changed { .. }))
    }

    fn count(&self, pred: impl Fn(&Change) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.change)).count()
    }

    /// Entries that are not removals.
    pub fn upserts(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|e| !matches!(e.change, Change::Removed { .. }))
    }

    pub fn removed_paths(&self) -> impl Iterator<Item = &TokenPath> {
        self.entries
            .iter()
            .filter(|e| matches!(e.change, Change::Removed { .. }))
            .map(|e| &e.path)
    }
}

impl<'a> IntoIterator for &'a TokenDiff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One differing path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: TokenPath,
    #[serde(flatten)]
    pub change: Change,
}

impl DiffEntry {
    /// The token as it is in the base tree.
    pub fn old_token(&self) -> Option<&Token> {
        match &self.change {
            Change::Removed { old } | Change::Changed { old, .. } => Some(old),
            Change::Added { .. } => None,
        }
    }

    /// The token as proposed.
    pub fn new_token(&self) -> Option<&Token> {
        match &self.change {
            Change::Added { new } | Change::Changed { new, .. } => Some(new),
            Change::Removed { .. } => None,
        }
    }
}

/// How a path differs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum Change {
    /// Present only in the proposed tree.
    Added { new: Token },
    /// Present only in the base tree.
    Removed { old: Token },
    /// Present in both with a different value, type, or both.
    Changed { old: Token, new: Token },
}

impl Change {
    pub fn label(&self) -> &'static str {
        match self {
            Change::Added { .. } => "added",
            Change::Removed { .. } => "removed",
            Change::Changed { .. } => "changed",
        }
    }

    pub fn value_changed(&self) -> bool {
        match self {
            Change::Changed { old, new } => !old.same_value(new),
            _ => true,
        }
    }

    pub fn type_changed(&self) -> bool {
        match self {
            Change::Changed { old, new } => old.token_type != new.token_type,
            _ => true,
        }
    }
}

/// Compute the diff from `base` to `proposed`.
///
/// Base paths come first in base order (removed or changed), then paths
/// only in `proposed` in proposed order. Only value and type are compared;
/// composite values compare field by field. A path repeated within one tree
/// is compared once, using its first occurrence.
pub fn diff(base: &TokenTree, proposed: &TokenTree) -> TokenDiff {
    let mut entries = Vec::new();
    let mut visited: HashSet<TokenPath> = HashSet::new();

    for (path, old) in base.tokens() {
        if !visited.insert(path.clone()) {
            continue;
        }
        let change = match proposed.get(&path) {
            Some(new) if old.same_content(new) => continue,
            Some(new) => Change::Changed {
                old: old.clone(),
                new: new.clone(),
            },
            None => Change::Removed { old: old.clone() },
        };
        entries.push(DiffEntry { path, change });
    }

    for (path, new) in proposed.tokens() {
        if visited.insert(path.clone()) {
            entries.push(DiffEntry {
                path,
                change: Change::Added { new: new.clone() },
            });
        }
    }

    TokenDiff { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsync_types::{TokenKind, TokenValue, Typography};
    use proptest::prelude::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_json_value(value).unwrap()
    }

    #[test]
    fn changed_value_is_one_entry() {
        let base = tree(json!({"spacing": {"sm": {"value": "8px", "type": "dimension"}}}));
        let proposed = tree(json!({"spacing": {"sm": {"value": "10px", "type": "dimension"}}}));
        let d = diff(&base, &proposed);

        assert_eq!(d.len(), 1);
        let entry = &d.entries()[0];
        assert_eq!(entry.path, TokenPath::new("spacing", "sm"));
        assert_eq!(entry.change.label(), "changed");
        assert_eq!(entry.old_token().unwrap().value, Some(TokenValue::from("8px")));
        assert_eq!(entry.new_token().unwrap().value, Some(TokenValue::from("10px")));
        assert!(entry.change.value_changed());
        assert!(!entry.change.type_changed());
    }

    #[test]
    fn identical_trees_have_empty_diff() {
        let t = tree(json!({
            "colors": {"a": {"value": "#111", "type": "color"}},
            "typography": {"h": {"value": {"fontFamily": "Inter", "fontSize": 24, "fontWeight": 700}, "type": "typography"}}
        }));
        assert!(diff(&t, &t).is_empty());
    }

    #[test]
    fn added_and_removed_paths() {
        let base = tree(json!({"colors": {
            "keep": {"value": "#111", "type": "color"},
            "gone": {"value": "#222", "type": "color"}
        }}));
        let proposed = tree(json!({
            "colors": {"keep": {"value": "#111", "type": "color"}},
            "motion": {"fast": {"value": "150ms", "type": "duration"}}
        }));
        let d = diff(&base, &proposed);
        assert_eq!(d.len(), 2);
        assert_eq!(d.removals(), 1);
        assert_eq!(d.additions(), 1);
        assert_eq!(d.modifications(), 0);
        assert_eq!(
            d.removed_paths().collect::<Vec<_>>(),
            vec![&TokenPath::new("colors", "gone")]
        );
        assert_eq!(d.upserts().count(), 1);
    }

    #[test]
    fn type_change_alone_is_a_change() {
        let base = tree(json!({"fonts": {"w": {"value": 700, "type": "number"}}}));
        let proposed = tree(json!({"fonts": {"w": {"value": 700, "type": "fontWeight"}}}));
        let d = diff(&base, &proposed);
        assert_eq!(d.modifications(), 1);
        assert!(d.entries()[0].change.type_changed());
        assert!(!d.entries()[0].change.value_changed());
    }

    #[test]
    fn composites_compare_deeply() {
        let a = Token::typography(Typography::new("Inter", 24.0, 700.0));
        let mut b_tree = TokenTree::new();
        let mut a_tree = TokenTree::new();
        let path = TokenPath::new("typography", "heading");
        a_tree.insert(&path, a);
        // Same fields, built independently, with a float font size.
        b_tree.insert(
            &path,
            tree(json!({"typography": {"heading": {"value": {"fontWeight": 700, "fontSize": 24.0, "fontFamily": "Inter"}, "type": "typography"}}}))
                .get(&path)
                .unwrap()
                .clone(),
        );
        assert!(diff(&a_tree, &b_tree).is_empty());

        b_tree.insert(&path, Token::typography(Typography::new("Inter", 24.0, 600.0)));
        assert_eq!(diff(&a_tree, &b_tree).modifications(), 1);
    }

    #[test]
    fn color_spelling_is_not_a_change() {
        let base = tree(json!({"colors": {
            "primary": {"value": "#1E40AF", "type": "color"},
            "white": {"value": "#FFFFFF", "type": "color"}
        }}));
        let proposed = tree(json!({"colors": {
            "primary": {"value": "#1e40af", "type": "color"},
            "white": {"value": "#fff", "type": "color"}
        }}));
        assert!(diff(&base, &proposed).is_empty());

        let darker = tree(json!({"colors": {
            "primary": {"value": "#1e40ae", "type": "color"},
            "white": {"value": "#fff", "type": "color"}
        }}));
        let d = diff(&base, &darker);
        assert_eq!(d.modifications(), 1);
        assert!(d.entries()[0].change.value_changed());
    }

    #[test]
    fn descriptions_are_not_compared() {
        let base = tree(json!({"colors": {"a": {"value": "#111", "type": "color"}}}));
        let proposed = tree(json!({"colors": {"a": {"value": "#111", "type": "color", "description": "new"}}}));
        assert!(diff(&base, &proposed).is_empty());
    }

    #[test]
    fn serializes_for_previews() {
        let base = tree(json!({"spacing": {"sm": {"value": "8px", "type": "dimension"}}}));
        let proposed = tree(json!({"spacing": {"sm": {"value": "10px", "type": "dimension"}}}));
        let json = serde_json::to_value(diff(&base, &proposed)).unwrap();
        assert_eq!(
            json,
            json!([{
                "path": "spacing.sm",
                "change": "changed",
                "old": {"value": "8px", "type": "dimension"},
                "new": {"value": "10px", "type": "dimension"}
            }])
        );
    }

    fn arb_tree() -> impl Strategy<Value = TokenTree> {
        let entry = (
            prop::sample::select(vec!["colors", "spacing"]),
            prop::sample::select(vec!["a", "b", "c", "d", "e"]),
            0u8..4,
            any::<bool>(),
        );
        prop::collection::vec(entry, 0..10).prop_map(|entries| {
            let mut tree = TokenTree::new();
            for (category, name, n, as_number) in entries {
                let token = if as_number {
                    Token::new(i64::from(n), TokenKind::Number)
                } else {
                    Token::new(format!("{n}px"), TokenKind::Dimension)
                };
                tree.insert(&TokenPath::new(category, name), token);
            }
            tree
        })
    }

    proptest! {
        #[test]
        fn diff_contains_exactly_the_differing_paths(base in arb_tree(), proposed in arb_tree()) {
            let d = diff(&base, &proposed);
            let mut all: Vec<TokenPath> = base.paths().chain(proposed.paths()).collect();
            all.sort();
            all.dedup();
            for path in all {
                let differs = match (base.get(&path), proposed.get(&path)) {
                    (Some(a), Some(b)) => !a.same_content(b),
                    _ => true,
                };
                prop_assert_eq!(d.get(&path).is_some(), differs);
            }
        }

        #[test]
        fn self_diff_is_empty(t in arb_tree()) {
            prop_assert!(diff(&t, &t).is_empty());
        }
    }
}
