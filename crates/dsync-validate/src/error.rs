use thiserror::Error;

use crate::report::ValidationReport;

/// A tree failed validation. Carries the full report.
#[derive(Debug, Error)]
#[error("token validation failed with {} problem(s)", .0.failures().len())]
pub struct ValidationError(pub ValidationReport);

impl ValidationError {
    pub fn report(&self) -> &ValidationReport {
        &self.0
    }
}
