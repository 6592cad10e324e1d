use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use dsync_transform::RemoteVariables;

use crate::remote::{PushReceipt, RemoteError, RemotePush, RemoteTokens};

/// Remote variable store held in memory, for tests, demos, and the server's
/// offline mode. Counts every call so callers can assert on remote traffic.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    files: RwLock<HashMap<String, RemoteVariables>>,
    failure: RwLock<Option<RemoteError>>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
}

fn poisoned() -> RemoteError {
    RemoteError::Transport("in-memory remote lock poisoned".into())
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(file_id: impl Into<String>, variables: RemoteVariables) -> Self {
        let remote = Self::new();
        if let Ok(mut files) = remote.files.write() {
            files.insert(file_id.into(), variables);
        }
        remote
    }

    /// Current contents of a file.
    pub fn file(&self, file_id: &str) -> Option<RemoteVariables> {
        self.files.read().ok()?.get(file_id).cloned()
    }

    /// Make every following call fail with `error`, or succeed again with
    /// `None`.
    pub fn set_failure(&self, error: Option<RemoteError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = error;
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.fetch_count() + self.push_count()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        match self.failure.read().map_err(|_| poisoned())?.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteTokens for InMemoryRemote {
    async fn fetch_tokens(&self, file_id: &str) -> Result<RemoteVariables, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.files
            .read()
            .map_err(|_| poisoned())?
            .get(file_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("file {file_id}")))
    }

    async fn push_tokens(&self, file_id: &str, push: &RemotePush) -> Result<PushReceipt, RemoteError> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let mut files = self.files.write().map_err(|_| poisoned())?;
        let file = files
            .get_mut(file_id)
            .ok_or_else(|| RemoteError::NotFound(format!("file {file_id}")))?;

        for collection in push.upserts.variable_collections.values() {
            let entry = file
                .variable_collections
                .entry(collection.id.clone())
                .or_insert_with(|| collection.clone());
            entry.name = collection.name.clone();
        }
        for variable in push.upserts.variables.values() {
            file.add_variable(variable.clone());
        }

        let mut deleted = 0;
        for id in &push.deletes {
            if file.variables.remove(id).is_some() {
                deleted += 1;
            }
            for collection in file.variable_collections.values_mut() {
                collection.variable_ids.retain(|v| v != id);
            }
        }

        Ok(PushReceipt {
            applied_count: push.upserts.variables.len() + deleted,
        })
    }
}
