//! Operations that never touch the remote: merge, transform, and build.

use dsync_merge::Merger;
use dsync_transform::{
    from_build_str, prepare_for_platform, to_build_format, BuildTree, Transformed,
};
use dsync_types::{Platform, TokenTree};
use dsync_validate::Validator;
use tracing::{debug, info};

use crate::build::{BuildOutcome, BuildRequest, BuildTool};
use crate::error::SyncResult;
use crate::types::MergeReport;

/// Validate every source, then fold them in order, later sources winning.
///
/// A single invalid source aborts the merge; nothing is dropped silently.
pub fn merge_sources(sources: &[TokenTree], validator: &Validator) -> SyncResult<MergeReport> {
    let merger = Merger::validated(sources, validator)?;
    let overridden = merger.overridden().to_vec();
    let sources = merger.sources();
    let tree = merger.finish();
    info!(
        sources,
        tokens = tree.token_count(),
        overridden = overridden.len(),
        "merge complete"
    );
    Ok(MergeReport {
        tree,
        sources,
        overridden,
    })
}

/// Canonical tree to the build-tool nested format, optionally prepared for
/// one platform. The tree must validate; with `strict`, any per-path
/// transform failure is an error.
pub fn transform_to_build(
    tree: &TokenTree,
    platform: Option<Platform>,
    strict: bool,
    validator: &Validator,
) -> SyncResult<Transformed<BuildTree>> {
    validator.validate(tree).into_result()?;
    let mut transformed = to_build_format(tree);
    if strict && !transformed.is_clean() {
        return Err(transformed.failures.into());
    }
    if let Some(platform) = platform {
        transformed = transformed.map(|nested| prepare_for_platform(nested, platform));
    }
    debug!(
        tokens = transformed.output.token_count(),
        failures = transformed.failures.len(),
        "transformed to build format"
    );
    Ok(transformed)
}

/// Build-tool nested JSON back to a canonical tree.
pub fn transform_from_build(json: &str, strict: bool) -> SyncResult<Transformed<TokenTree>> {
    let transformed = from_build_str(json)?;
    if strict && !transformed.is_clean() {
        return Err(transformed.failures.into());
    }
    Ok(transformed)
}

/// Hand a validated tree to the build tool, once per platform, in order.
pub async fn build(
    tree: &TokenTree,
    platforms: &[Platform],
    tool: &dyn BuildTool,
    validator: &Validator,
) -> SyncResult<Vec<BuildOutcome>> {
    validator.validate(tree).into_result()?;
    let nested = to_build_format(tree).strict()?;

    let mut outcomes = Vec::with_capacity(platforms.len());
    for &platform in platforms {
        let request = BuildRequest {
            platform,
            tokens: prepare_for_platform(nested.clone(), platform),
        };
        info!(platform = platform.as_str(), tokens = request.tokens.token_count(), "running build");
        outcomes.push(tool.build(&request).await?);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use async_trait::async_trait;
    use dsync_merge::MergeError;
    use serde_json::json;
    use std::sync::Mutex;

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_json_value(value).unwrap()
    }

    #[test]
    fn merge_prefers_later_sources() {
        let report = merge_sources(
            &[
                tree(json!({"colors": {"a": {"value": "#111", "type": "color"}}})),
                tree(json!({"colors": {"a": {"value": "#222", "type": "color"}}})),
            ],
            &Validator::default(),
        )
        .unwrap();
        let a = report.tree.get(&dsync_types::TokenPath::new("colors", "a")).unwrap();
        assert_eq!(a.value.as_ref().unwrap().as_str(), Some("#222"));
        assert_eq!(report.sources, 2);
        assert_eq!(report.overridden.len(), 1);
    }

    #[test]
    fn invalid_source_aborts_merge() {
        let err = merge_sources(
            &[
                tree(json!({"colors": {"a": {"value": "#111", "type": "color"}}})),
                tree(json!({"colors": {"b": {"value": "#222"}}})),
            ],
            &Validator::default(),
        )
        .unwrap_err();
        match err {
            SyncError::Merge(MergeError::InvalidSource { index, report }) => {
                assert_eq!(index, 1);
                assert_eq!(report.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transform_requires_valid_tree() {
        let err = transform_to_build(
            &tree(json!({"colors": {"a": {"value": "#111"}}})),
            None,
            false,
            &Validator::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn transform_for_android_prefixes_alpha() {
        let out = transform_to_build(
            &tree(json!({"colors": {"a": {"value": "#1E40AF", "type": "color"}}})),
            Some(Platform::Android),
            true,
            &Validator::default(),
        )
        .unwrap();
        let token = out.output.get(&dsync_types::TokenPath::new("colors", "a")).unwrap();
        assert_eq!(token.value.as_str(), Some("#FF1E40AF"));
    }

    #[test]
    fn transform_from_build_strips_attributes() {
        let json = r##"{"colors":{"a":{"value":"#111","type":"color","attributes":{"category":"colors","type":"color","item":"a"}}}}"##;
        let out = transform_from_build(json, true).unwrap();
        assert_eq!(
            out.output,
            tree(json!({"colors": {"a": {"value": "#111", "type": "color"}}}))
        );
    }

    #[test]
    fn strict_transform_from_build_rejects_deep_nesting() {
        let json = r##"{"colors":{"brand":{"primary":{"value":"#111","type":"color"}}}}"##;
        let err = transform_from_build(json, true).unwrap_err();
        assert!(matches!(err, SyncError::Transform(_)));
        let lenient = transform_from_build(json, false).unwrap();
        assert_eq!(lenient.failures.len(), 1);
    }

    #[derive(Default)]
    struct RecordingTool {
        calls: Mutex<Vec<(Platform, usize)>>,
    }

    #[async_trait]
    impl BuildTool for RecordingTool {
        async fn build(&self, request: &BuildRequest) -> SyncResult<BuildOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((request.platform, request.tokens.token_count()));
            Ok(BuildOutcome {
                platform: Some(request.platform),
                log: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn build_runs_each_platform_in_order() {
        let tool = RecordingTool::default();
        let tokens = tree(json!({
            "colors": {"a": {"value": "#111", "type": "color"}},
            "spacing": {"sm": {"value": "8px", "type": "dimension"}}
        }));
        let outcomes = build(
            &tokens,
            &[Platform::Css, Platform::Ios],
            &tool,
            &Validator::default(),
        )
        .await
        .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            *tool.calls.lock().unwrap(),
            vec![(Platform::Css, 2), (Platform::Ios, 2)]
        );
    }

    #[tokio::test]
    async fn build_never_runs_on_invalid_tree() {
        let tool = RecordingTool::default();
        let tokens = tree(json!({"colors": {"a": {"value": "#111"}}}));
        assert!(build(&tokens, &[Platform::Css], &tool, &Validator::default())
            .await
            .is_err());
        assert!(tool.calls.lock().unwrap().is_empty());
    }
}
