//! Ordered last-source-wins merging.

use dsync_types::{TokenCategory, TokenPath, TokenTree};
use dsync_validate::Validator;
use tracing::debug;

use crate::error::{MergeError, MergeResult};

/// Accumulates token trees in order.
///
/// Each [`add`](Merger::add) unions the source's categories into the result
/// and overwrites any token already present at the same path. A replaced
/// token keeps the position where its path was first seen.
#[derive(Clone, Debug, Default)]
pub struct Merger {
    tree: TokenTree,
    sources: usize,
    overridden: Vec<TokenPath>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one more source into the result. Its tokens win over every
    /// source added before it.
    pub fn add(&mut self, source: &TokenTree) -> &mut Self {
        for (category, tokens) in source.categories() {
            if self.tree.category(category).is_none() {
                self.tree.insert_category(category, TokenCategory::new());
            }
            for (name, token) in tokens.iter() {
                let path = TokenPath::new(category, name);
                let previous = self.tree.insert(&path, token.clone());
                if previous.is_some_and(|p| p != *token) && !self.overridden.contains(&path) {
                    self.overridden.push(path);
                }
            }
        }
        self.sources += 1;
        self
    }

    /// Number of sources folded so far.
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Paths where a later source replaced a different earlier token.
    pub fn overridden(&self) -> &[TokenPath] {
        &self.overridden
    }

    /// Validate every source with `validator`, then fold them in order.
    ///
    /// The first invalid source aborts with [`MergeError::InvalidSource`]
    /// carrying its full report, before anything is folded.
    pub fn validated(trees: &[TokenTree], validator: &Validator) -> MergeResult<Self> {
        for (index, tree) in trees.iter().enumerate() {
            let report = validator.validate(tree);
            if !report.is_valid() {
                return Err(MergeError::InvalidSource { index, report });
            }
        }
        let mut merger = Self::new();
        for tree in trees {
            merger.add(tree);
        }
        Ok(merger)
    }

    pub fn finish(self) -> TokenTree {
        debug!(
            sources = self.sources,
            tokens = self.tree.token_count(),
            overridden = self.overridden.len(),
            "merged token trees"
        );
        self.tree
    }
}

/// Merge `trees` in order, later trees winning.
///
/// The inputs are trusted to be valid; use [`merge_validated`] when they are
/// not known to be. An empty slice yields an empty tree.
pub fn merge(trees: &[TokenTree]) -> TokenTree {
    let mut merger = Merger::new();
    for tree in trees {
        merger.add(tree);
    }
    merger.finish()
}

/// Validate each source with `validator`, then [`merge`] them. See
/// [`Merger::validated`].
pub fn merge_validated(trees: &[TokenTree], validator: &Validator) -> MergeResult<TokenTree> {
    Merger::validated(trees, validator).map(Merger::finish)
}
