//! Error types for the transform crate.

use std::fmt;

use dsync_types::{TokenKind, TokenPath};
use serde::{Serialize, Serializer};

/// Why one token (or one remote variable) could not be transformed.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The remote resolved type and scopes have no entry in the type table.
    #[error("unmapped remote type {resolved_type} (scopes: {scopes})")]
    UnmappedRemoteType {
        resolved_type: String,
        scopes: String,
    },

    #[error("token has no type")]
    MissingType,

    #[error("token has no value")]
    MissingValue,

    #[error("unrecognized type '{0}'")]
    UnrecognizedType(String),

    #[error("invalid {kind} value: {detail}")]
    InvalidValue { kind: TokenKind, detail: String },

    /// Only pixel dimensions exist on the remote side.
    #[error("dimension unit '{0}' cannot be sent; only px is supported remotely")]
    UnsupportedUnit(String),

    #[error("incomplete typography composite: missing {0}")]
    IncompleteTypography(String),

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("no value for mode '{0}'")]
    MissingModeValue(String),

    #[error("variable alias '{0}' could not be resolved")]
    UnresolvedAlias(String),

    #[error("variable belongs to unknown collection '{0}'")]
    UnknownCollection(String),

    /// Two names normalize to the same token name.
    #[error("name collides with '{0}' after normalization")]
    NameCollision(String),

    #[error("nested deeper than category.token")]
    TooDeep,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The whole document could not be read.
    #[error("malformed build document: {0}")]
    Document(#[from] serde_json::Error),
}

/// One `(path, error)` entry.
#[derive(Debug)]
pub struct TransformFailure {
    pub path: TokenPath,
    pub error: TransformError,
}

impl TransformFailure {
    pub fn new(path: TokenPath, error: TransformError) -> Self {
        Self { path, error }
    }
}

impl fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

impl Serialize for TransformFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TransformFailure", 2)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("reason", &self.error.to_string())?;
        s.end()
    }
}

/// Failures collected over a whole transform, in tree order.
#[derive(Debug, Default, Serialize, thiserror::Error)]
#[error("{} token(s) failed to transform", .failures.len())]
#[serde(transparent)]
pub struct TransformFailures {
    failures: Vec<TransformFailure>,
}

impl TransformFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: TokenPath, error: TransformError) {
        self.failures.push(TransformFailure::new(path, error));
    }

    pub fn extend(&mut self, other: TransformFailures) {
        self.failures.extend(other.failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformFailure> {
        self.failures.iter()
    }

    /// Returns `true` if any failure is recorded against `path`.
    pub fn contains(&self, path: &TokenPath) -> bool {
        self.failures.iter().any(|f| &f.path == path)
    }
}

impl IntoIterator for TransformFailures {
    type Item = TransformFailure;
    type IntoIter = std::vec::IntoIter<TransformFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

/// Output of a transform together with the paths that were skipped.
#[derive(Debug)]
pub struct Transformed<T> {
    pub output: T,
    pub failures: TransformFailures,
}

impl<T> Transformed<T> {
    pub fn new(output: T, failures: TransformFailures) -> Self {
        Self { output, failures }
    }

    /// Returns `true` if every path transformed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fail-fast view: the output only if nothing failed.
    pub fn strict(self) -> Result<T, TransformFailures> {
        if self.failures.is_empty() {
            Ok(self.output)
        } else {
            Err(self.failures)
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Transformed<U> {
        Transformed {
            output: f(self.output),
            failures: self.failures,
        }
    }
}
