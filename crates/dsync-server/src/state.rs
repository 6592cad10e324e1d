use std::sync::Arc;

use dsync_sync::{RemoteTokens, SyncEngine};
use dsync_validate::Validator;

use crate::error::{ServerError, ServerResult};

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    remote: Arc<dyn RemoteTokens>,
    file_id: Option<String>,
    validator: Validator,
}

impl AppState {
    pub fn new(remote: Arc<dyn RemoteTokens>, file_id: Option<String>) -> Self {
        Self {
            remote,
            file_id,
            validator: Validator::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// An engine for the configured file.
    pub fn engine(&self) -> ServerResult<SyncEngine> {
        let file_id = self
            .file_id
            .as_deref()
            .ok_or(ServerError::NotConfigured("FIGMA_FILE_ID"))?;
        Ok(SyncEngine::new(self.remote.clone(), file_id).with_validator(self.validator.clone()))
    }
}
