use std::fmt;

use dsync_types::{TokenKind, TokenPath};
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// Why a path failed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    MissingValue,
    MissingType,
    UnrecognizedType(String),
    /// A recognized kind that the validator's allow-list excludes.
    KindNotAllowed(TokenKind),
    InvalidValue { kind: TokenKind, detail: String },
    EmptyName,
    /// The name contains a path separator.
    InvalidName(char),
    DuplicateName,
    DuplicateCategory,
    NestedGroup,
    /// The entry is not an object of the expected shape.
    Malformed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::MissingValue => f.write_str("missing value"),
            FailureReason::MissingType => f.write_str("missing type"),
            FailureReason::UnrecognizedType(raw) => write!(f, "unrecognized type '{raw}'"),
            FailureReason::KindNotAllowed(kind) => write!(f, "type '{kind}' is not allowed"),
            FailureReason::InvalidValue { kind, detail } => {
                write!(f, "invalid {kind} value: {detail}")
            }
            FailureReason::EmptyName => f.write_str("name must not be empty"),
            FailureReason::InvalidName(c) => write!(f, "name must not contain '{c}'"),
            FailureReason::DuplicateName => f.write_str("duplicate token name"),
            FailureReason::DuplicateCategory => f.write_str("duplicate category name"),
            FailureReason::NestedGroup => {
                f.write_str("nested groups are not allowed below a category")
            }
            FailureReason::Malformed(detail) => write!(f, "malformed entry: {detail}"),
        }
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One `(path, reason)` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub path: TokenPath,
    pub reason: FailureReason,
}

impl ValidationFailure {
    pub fn new(path: TokenPath, reason: FailureReason) -> Self {
        Self { path, reason }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Result of validating a tree: empty on success, otherwise every failure in
/// tree order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn new(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    /// Returns `true` if no failures were recorded.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures recorded against one path.
    pub fn failures_at<'a>(
        &'a self,
        path: &'a TokenPath,
    ) -> impl Iterator<Item = &'a ValidationFailure> + 'a {
        self.failures.iter().filter(move |f| &f.path == path)
    }

    /// `Ok(())` when valid, otherwise the report wrapped as an error.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_valid() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn failure_display() {
        let failure = ValidationFailure::new(
            TokenPath::new("colors", "primary"),
            FailureReason::MissingType,
        );
        assert_eq!(failure.to_string(), "colors.primary: missing type");
    }

    #[test]
    fn failure_serializes_path_and_reason() {
        let failure = ValidationFailure::new(
            TokenPath::new("spacing", "sm"),
            FailureReason::UnrecognizedType("shadow".into()),
        );
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["path"], "spacing.sm");
        assert_eq!(json["reason"], "unrecognized type 'shadow'");
    }

    #[test]
    fn into_result_wraps_failures() {
        let report = ValidationReport::new(vec![ValidationFailure::new(
            TokenPath::category("colors"),
            FailureReason::DuplicateCategory,
        )]);
        let err = report.into_result().unwrap_err();
        assert_eq!(err.report().len(), 1);
        assert!(err.to_string().contains("1 problem"));
    }
}
