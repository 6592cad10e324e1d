//! Remote operations: pull and push.

use std::collections::HashSet;
use std::sync::Arc;

use dsync_diff::{diff, TokenDiff};
use dsync_merge::merge;
use dsync_transform::{
    camel_case, pulled_names, remote_ids_for, to_design_tool, PullSettings, PulledNames,
    RemoteVariables, TransformFailures,
};
use dsync_types::{TokenPath, TokenTree};
use dsync_validate::Validator;
use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::remote::{RemotePush, RemoteSnapshot, RemoteTokens};
use crate::types::{PullOptions, PullReport, PushOptions, PushReport};

/// Runs pull and push against one design file.
///
/// The engine holds no remote state between calls. Every operation fetches
/// (or is handed) its own [`RemoteSnapshot`] and awaits each remote call
/// before issuing the next.
#[derive(Clone)]
pub struct SyncEngine {
    remote: Arc<dyn RemoteTokens>,
    file_id: String,
    validator: Validator,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteTokens>, file_id: impl Into<String>) -> Self {
        Self {
            remote,
            file_id: file_id.into(),
            validator: Validator::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Fetch the remote tokens as a canonical tree.
    ///
    /// Paths that fail to convert and validation failures are reported next
    /// to the best-effort tree. With `strict`, either kind of failure is an
    /// error instead.
    pub async fn pull(&self, options: &PullOptions) -> SyncResult<PullReport> {
        info!(file_id = %self.file_id, mode = ?options.mode, "pulling tokens");
        let (snapshot, transform_failures) = self.snapshot(options.mode.clone()).await?;
        if options.strict && !transform_failures.is_empty() {
            return Err(transform_failures.into());
        }

        let validation = self.validator.validate(&snapshot.tree);
        if options.strict {
            validation.clone().into_result()?;
        } else if !validation.is_valid() {
            warn!(failures = validation.len(), "pulled tokens failed validation");
        }

        info!(
            tokens = snapshot.tree.token_count(),
            transform_failures = transform_failures.len(),
            "pull complete"
        );
        Ok(PullReport {
            tree: snapshot.tree,
            validation,
            transform_failures,
        })
    }

    /// Fetch the remote once and convert it. Paths that failed to convert
    /// are left out of the snapshot tree and returned alongside.
    pub async fn snapshot(
        &self,
        mode: Option<String>,
    ) -> SyncResult<(RemoteSnapshot, TransformFailures)> {
        let raw = self.remote.fetch_tokens(&self.file_id).await?;
        debug!(
            collections = raw.variable_collections.len(),
            variables = raw.variables.len(),
            "fetched remote variables"
        );
        Ok(RemoteSnapshot::from_raw(raw, &PullSettings { mode }))
    }

    /// Push `local` to the remote.
    ///
    /// The tree is validated before anything touches the remote. Then the
    /// remote is fetched once and [`push_against`](Self::push_against) runs
    /// against that snapshot.
    pub async fn push(&self, local: &TokenTree, options: &PushOptions) -> SyncResult<PushReport> {
        self.validator.validate(local).into_result()?;
        let (snapshot, failures) = self.snapshot(None).await?;
        if !failures.is_empty() {
            warn!(
                failures = failures.len(),
                "some remote variables could not be read; their paths count as absent"
            );
        }
        self.push_against(local, &snapshot, options).await
    }

    /// Push `local` against a known remote snapshot.
    ///
    /// Local names are compared under the camelCase names a pull produces,
    /// so `space-2` matches the remote variable it created. Only differing
    /// paths are sent. An empty diff, or a dry run, returns without a remote
    /// call. `applied` counts the diff entries that were (or would be) sent.
    pub async fn push_against(
        &self,
        local: &TokenTree,
        snapshot: &RemoteSnapshot,
        options: &PushOptions,
    ) -> SyncResult<PushReport> {
        self.validator.validate(local).into_result()?;

        let renamed = pulled_names(local);
        let (names, mut transform_failures) = (renamed.output, renamed.failures);
        if options.strict && !transform_failures.is_empty() {
            return Err(transform_failures.into());
        }

        let proposed = if options.merge_remote {
            merge(&[snapshot.tree.clone(), names.tree.clone()])
        } else {
            names.tree.clone()
        };
        let diff = diff(&snapshot.tree, &proposed);
        if diff.is_empty() {
            info!("remote already up to date");
            return Ok(PushReport {
                diff,
                applied: 0,
                dry_run: options.dry_run,
                transform_failures,
                receipt: None,
            });
        }

        let (push, plan_failures, applied) = plan_push(&diff, snapshot, &names);
        transform_failures.extend(plan_failures);
        if options.strict && !transform_failures.is_empty() {
            return Err(transform_failures.into());
        }
        for failure in transform_failures.iter() {
            warn!(path = %failure.path, error = %failure.error, "skipping token");
        }

        info!(
            added = diff.additions(),
            removed = diff.removals(),
            changed = diff.modifications(),
            applied,
            dry_run = options.dry_run,
            "computed push"
        );
        if options.dry_run || push.is_empty() {
            return Ok(PushReport {
                diff,
                applied: if options.dry_run { applied } else { 0 },
                dry_run: options.dry_run,
                transform_failures,
                receipt: None,
            });
        }

        let receipt = self.remote.push_tokens(&self.file_id, &push).await?;
        info!(applied, remote_applied = receipt.applied_count, "push complete");
        Ok(PushReport {
            diff,
            applied,
            dry_run: false,
            transform_failures,
            receipt: Some(receipt),
        })
    }
}

/// Turn a diff into the remote write: converted upserts, and the ids of
/// removed variables plus variables a changed token no longer uses.
/// New variables are created under the local spelling in `names`.
fn plan_push(
    diff: &TokenDiff,
    snapshot: &RemoteSnapshot,
    names: &PulledNames,
) -> (RemotePush, TransformFailures, usize) {
    let changed: TokenTree = {
        let mut tree = TokenTree::new();
        for entry in diff.upserts() {
            if let Some(token) = entry.new_token() {
                let path = TokenPath::new(&entry.path.category, names.local_name(&entry.path));
                tree.insert(&path, token.clone());
            }
        }
        tree
    };
    let converted = to_design_tool(&changed, Some(&snapshot.raw));
    let upserts = converted.output;
    let mut failures = TransformFailures::new();
    for failure in converted.failures {
        let path = TokenPath::new(&failure.path.category, camel_case(&failure.path.name));
        failures.push(path, failure.error);
    }

    let mut deletes: Vec<String> = Vec::new();
    let mut applied = 0;
    for entry in diff {
        if failures.contains(&entry.path) {
            continue;
        }
        let stale: Vec<String> = remote_ids_for(&snapshot.raw, &entry.path)
            .into_iter()
            .filter(|id| !upserts.variables.contains_key(id))
            .collect();
        let removing = entry.new_token().is_none();
        if removing && stale.is_empty() {
            continue;
        }
        applied += 1;
        deletes.extend(stale);
    }
    dedup(&mut deletes);

    let upserts = prune_unused_collections(upserts, diff, &failures);
    (RemotePush { upserts, deletes }, failures, applied)
}

fn dedup(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Drop collections that end up with no variables because all of their
/// tokens failed to convert.
fn prune_unused_collections(
    mut upserts: RemoteVariables,
    diff: &TokenDiff,
    failures: &TransformFailures,
) -> RemoteVariables {
    let live: HashSet<&str> = diff
        .upserts()
        .filter(|e| !failures.contains(&e.path))
        .map(|e| e.path.category.as_str())
        .collect();
    upserts
        .variable_collections
        .retain(|_, c| live.contains(c.name.as_str()));
    upserts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::memory::InMemoryRemote;
    use crate::remote::RemoteError;
    use dsync_diff::Change;
    use dsync_transform::{RemoteCollection, RemoteVariable, ResolvedType};
    use dsync_types::TokenPath;
    use dsync_types::TokenValue;
    use serde_json::json;

    const FILE: &str = "file-1";

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_json_value(value).unwrap()
    }

    fn remote_with(tokens: serde_json::Value) -> Arc<InMemoryRemote> {
        let raw = RemoteSnapshot::from_tree(tree(tokens)).raw;
        Arc::new(InMemoryRemote::with_file(FILE, raw))
    }

    fn engine(remote: &Arc<InMemoryRemote>) -> SyncEngine {
        SyncEngine::new(remote.clone(), FILE)
    }

    fn spacing(value: &str) -> serde_json::Value {
        json!({"spacing": {"sm": {"value": value, "type": "dimension"}}})
    }

    #[tokio::test]
    async fn dry_run_against_snapshot_makes_no_remote_calls() {
        let remote = Arc::new(InMemoryRemote::new());
        let snapshot = RemoteSnapshot::from_tree(tree(spacing("8px")));
        let options = PushOptions {
            dry_run: true,
            ..PushOptions::default()
        };

        let report = engine(&remote)
            .push_against(&tree(spacing("10px")), &snapshot, &options)
            .await
            .unwrap();

        assert_eq!(remote.call_count(), 0);
        assert!(report.dry_run);
        assert_eq!(report.diff.len(), 1);
        let entry = report.diff.get(&TokenPath::new("spacing", "sm")).unwrap();
        match &entry.change {
            Change::Changed { old, new } => {
                assert_eq!(old.value, Some(TokenValue::from("8px")));
                assert_eq!(new.value, Some(TokenValue::from("10px")));
            }
            other => panic!("expected a change, got {other:?}"),
        }
        assert_eq!(report.applied, 1);
        assert!(report.receipt.is_none());
    }

    #[tokio::test]
    async fn dry_run_push_never_writes() {
        let remote = remote_with(spacing("8px"));
        let before = remote.file(FILE);
        let options = PushOptions {
            dry_run: true,
            ..PushOptions::default()
        };
        let report = engine(&remote)
            .push(&tree(spacing("10px")), &options)
            .await
            .unwrap();
        assert_eq!(report.diff.modifications(), 1);
        assert_eq!(remote.push_count(), 0);
        assert_eq!(remote.file(FILE), before);
    }

    #[tokio::test]
    async fn identical_push_is_a_noop() {
        let remote = remote_with(spacing("8px"));
        let report = engine(&remote)
            .push(&tree(spacing("8px")), &PushOptions::default())
            .await
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(report.applied, 0);
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn repeated_push_of_hyphenated_name_is_a_noop() {
        let remote = Arc::new(InMemoryRemote::with_file(FILE, RemoteVariables::new()));
        let local = tree(json!({"spacing": {"space-2": {"value": "8px", "type": "dimension"}}}));

        let first = engine(&remote).push(&local, &PushOptions::default()).await.unwrap();
        assert_eq!(first.applied, 1);
        let file = remote.file(FILE).unwrap();
        assert_eq!(file.variables["tmp:spacing/space-2"].name, "space-2");

        let second = engine(&remote).push(&local, &PushOptions::default()).await.unwrap();
        assert_eq!(second.applied, 0);
        assert!(second.is_noop());
        assert_eq!(remote.push_count(), 1);
        assert_eq!(remote.file(FILE).unwrap().variables.len(), 1);
    }

    #[tokio::test]
    async fn changing_a_hyphenated_token_updates_its_variable() {
        let remote = Arc::new(InMemoryRemote::with_file(FILE, RemoteVariables::new()));
        let at = |value: &str| tree(json!({"spacing": {"space-2": {"value": value, "type": "dimension"}}}));
        engine(&remote).push(&at("8px"), &PushOptions::default()).await.unwrap();

        let report = engine(&remote).push(&at("12px"), &PushOptions::default()).await.unwrap();
        assert_eq!(report.diff.modifications(), 1);
        let file = remote.file(FILE).unwrap();
        assert_eq!(file.variables.len(), 1);
        let variable = &file.variables["tmp:spacing/space-2"];
        assert_eq!(variable.values_by_mode.values().next(), Some(&json!(12)));
    }

    #[tokio::test]
    async fn repeated_push_of_lowercase_color_is_a_noop() {
        let remote = Arc::new(InMemoryRemote::with_file(FILE, RemoteVariables::new()));
        let local = tree(json!({
            "colors": {
                "primary": {"value": "#1e40af", "type": "color"},
                "white": {"value": "#fff", "type": "color"}
            }
        }));

        let first = engine(&remote).push(&local, &PushOptions::default()).await.unwrap();
        assert_eq!(first.applied, 2);
        let second = engine(&remote).push(&local, &PushOptions::default()).await.unwrap();
        assert_eq!(second.applied, 0);
        assert_eq!(remote.push_count(), 1);
    }

    #[tokio::test]
    async fn push_writes_changes_and_reuses_ids() {
        let remote = remote_with(spacing("8px"));
        let report = engine(&remote)
            .push(&tree(spacing("10px")), &PushOptions::default())
            .await
            .unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.receipt.unwrap().applied_count, 1);

        let file = remote.file(FILE).unwrap();
        assert_eq!(file.variables.len(), 1);
        let variable = file.variables.values().next().unwrap();
        assert_eq!(variable.id, "tmp:spacing/sm");
        assert_eq!(variable.values_by_mode.values().next(), Some(&json!(10)));

        let pulled = engine(&remote).pull(&PullOptions::default()).await.unwrap();
        assert_eq!(pulled.tree, tree(spacing("10px")));
    }

    #[tokio::test]
    async fn invalid_local_tree_aborts_before_any_remote_call() {
        let remote = remote_with(spacing("8px"));
        let err = engine(&remote)
            .push(
                &tree(json!({"colors": {"primary": {"value": "#FFF"}}})),
                &PushOptions::default(),
            )
            .await
            .unwrap_err();
        match err {
            SyncError::Validation(e) => {
                assert_eq!(e.report().failures()[0].to_string(), "colors.primary: missing type")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn merge_remote_keeps_remote_only_tokens() {
        let remote = remote_with(json!({
            "spacing": {
                "sm": {"value": "8px", "type": "dimension"},
                "lg": {"value": "24px", "type": "dimension"}
            }
        }));
        let report = engine(&remote)
            .push(&tree(spacing("10px")), &PushOptions::default())
            .await
            .unwrap();
        assert_eq!(report.diff.removals(), 0);
        assert_eq!(remote.file(FILE).unwrap().variables.len(), 2);
    }

    #[tokio::test]
    async fn without_merge_remote_only_tokens_are_deleted() {
        let remote = remote_with(json!({
            "spacing": {
                "sm": {"value": "8px", "type": "dimension"},
                "lg": {"value": "24px", "type": "dimension"}
            }
        }));
        let options = PushOptions {
            merge_remote: false,
            ..PushOptions::default()
        };
        let report = engine(&remote)
            .push(&tree(spacing("8px")), &options)
            .await
            .unwrap();
        assert_eq!(report.diff.removals(), 1);
        assert_eq!(report.applied, 1);

        let file = remote.file(FILE).unwrap();
        assert_eq!(file.variables.len(), 1);
        assert!(file.variables.contains_key("tmp:spacing/sm"));
    }

    #[tokio::test]
    async fn typography_push_sends_three_variables() {
        let remote = remote_with(json!({}));
        let heading = json!({
            "typography": {
                "heading": {
                    "value": {"fontFamily": "Inter", "fontSize": 24, "fontWeight": 700},
                    "type": "typography"
                }
            }
        });
        let report = engine(&remote)
            .push(&tree(heading.clone()), &PushOptions::default())
            .await
            .unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(remote.file(FILE).unwrap().variables.len(), 3);

        let pulled = engine(&remote).pull(&PullOptions::default()).await.unwrap();
        assert_eq!(pulled.tree, tree(heading));
    }

    #[tokio::test]
    async fn unconvertible_paths_are_skipped_unless_strict() {
        let remote = remote_with(json!({}));
        let local = tree(json!({
            "spacing": {
                "sm": {"value": "8px", "type": "dimension"},
                "rel": {"value": "1.5rem", "type": "dimension"}
            }
        }));

        let lenient = engine(&remote)
            .push_against(&local, &RemoteSnapshot::default(), &PushOptions {
                dry_run: true,
                ..PushOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(lenient.applied, 1);
        assert!(lenient.transform_failures.contains(&TokenPath::new("spacing", "rel")));

        let err = engine(&remote)
            .push(&local, &PushOptions {
                strict: true,
                ..PushOptions::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Transform(_)));
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn remote_errors_propagate_unchanged() {
        let remote = remote_with(spacing("8px"));
        remote.set_failure(Some(RemoteError::RateLimited {
            retry_after: Some(60),
        }));
        let err = engine(&remote)
            .push(&tree(spacing("10px")), &PushOptions::default())
            .await
            .unwrap_err();
        match err {
            SyncError::Remote(e) => assert_eq!(e, RemoteError::RateLimited { retry_after: Some(60) }),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(remote.fetch_count(), 1);
        assert_eq!(remote.push_count(), 0);
    }

    fn raw_with_unmapped_variable() -> RemoteVariables {
        let mut raw = RemoteVariables::new();
        let collection = RemoteCollection::new("c1", "flags");
        let mode = collection.default_mode_id.clone();
        raw.add_collection(collection);
        raw.add_variable(RemoteVariable {
            id: "v1".into(),
            name: "enabled".into(),
            variable_collection_id: "c1".into(),
            resolved_type: ResolvedType::Boolean,
            scopes: vec![],
            description: String::new(),
            values_by_mode: [(mode, json!(true))].into_iter().collect(),
        });
        raw.add_variable(RemoteVariable {
            id: "v2".into(),
            name: "opacity".into(),
            variable_collection_id: "c1".into(),
            resolved_type: ResolvedType::Float,
            scopes: vec!["OPACITY".into()],
            description: String::new(),
            values_by_mode: [("c1:default".to_string(), json!(0.5))].into_iter().collect(),
        });
        raw
    }

    #[tokio::test]
    async fn pull_is_best_effort_by_default() {
        let remote = Arc::new(InMemoryRemote::with_file(FILE, raw_with_unmapped_variable()));
        let report = engine(&remote).pull(&PullOptions::default()).await.unwrap();
        assert_eq!(report.tree.token_count(), 1);
        assert_eq!(report.transform_failures.len(), 1);
        assert!(report.validation.is_valid());
    }

    #[tokio::test]
    async fn strict_pull_fails_on_unmapped_types() {
        let remote = Arc::new(InMemoryRemote::with_file(FILE, raw_with_unmapped_variable()));
        let options = PullOptions {
            strict: true,
            mode: None,
        };
        let err = engine(&remote).pull(&options).await.unwrap_err();
        assert!(matches!(err, SyncError::Transform(_)));
    }

    #[tokio::test]
    async fn pull_missing_file_is_a_remote_error() {
        let remote = Arc::new(InMemoryRemote::new());
        let err = engine(&remote).pull(&PullOptions::default()).await.unwrap_err();
        assert!(matches!(err, SyncError::Remote(RemoteError::NotFound(_))));
    }
}
