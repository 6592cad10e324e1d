//! Validation of canonical token trees.
//!
//! Validation is fail-soft: one pass collects every problem in the tree, in
//! tree order, so a caller can report them all at once. It never mutates or
//! repairs its input.
//!
//! ```rust
//! use dsync_types::TokenTree;
//!
//! let tree = TokenTree::from_json_str(r##"{"colors":{"primary":{"value":"#FFF"}}}"##).unwrap();
//! let report = dsync_validate::validate(&tree);
//! assert_eq!(report.failures().len(), 1);
//! assert_eq!(report.failures()[0].to_string(), "colors.primary: missing type");
//! ```

pub mod error;
pub mod report;
pub mod validator;

pub use error::ValidationError;
pub use report::{FailureReason, ValidationFailure, ValidationReport};
pub use validator::{validate, Validator};
