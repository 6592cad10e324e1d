use std::time::Duration;

use async_trait::async_trait;
use dsync_sync::{PushReceipt, RemoteError, RemotePush, RemoteTokens};
use dsync_transform::RemoteVariables;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use tracing::{debug, info};

use crate::config::FigmaConfig;
use crate::error::{FigmaError, FigmaResult};
use crate::payload::{LocalVariablesResponse, VariablesUpdate};

pub const TOKEN_HEADER: &str = "X-Figma-Token";

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Figma REST client for one access token.
#[derive(Clone, Debug)]
pub struct FigmaClient {
    http: reqwest::Client,
    config: FigmaConfig,
}

impl FigmaClient {
    pub fn new(config: FigmaConfig) -> FigmaResult<Self> {
        if config.token.trim().is_empty() {
            return Err(FigmaError::MissingToken);
        }
        if !(config.api_base.starts_with("http://") || config.api_base.starts_with("https://")) {
            return Err(FigmaError::InvalidApiBase(config.api_base.clone()));
        }

        let mut token = HeaderValue::from_str(config.token.trim())
            .map_err(|_| FigmaError::InvalidToken)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("dsync/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FigmaConfig {
        &self.config
    }
}

#[async_trait]
impl RemoteTokens for FigmaClient {
    async fn fetch_tokens(&self, file_id: &str) -> Result<RemoteVariables, RemoteError> {
        let url = self.config.file_url(file_id, "variables/local");
        debug!(%url, "GET local variables");
        let response = self.http.get(&url).send().await.map_err(transport)?;
        let response = check_status(response, file_id).await?;
        let body: LocalVariablesResponse = response.json().await.map_err(transport)?;
        Ok(body.meta)
    }

    async fn push_tokens(&self, file_id: &str, push: &RemotePush) -> Result<PushReceipt, RemoteError> {
        let update = VariablesUpdate::from_push(push);
        let url = self.config.file_url(file_id, "variables");
        info!(
            %url,
            variables = update.variable_count(),
            collections = update.variable_collections.len(),
            "POST variables"
        );
        let response = self
            .http
            .post(&url)
            .json(&update)
            .send()
            .await
            .map_err(transport)?;
        check_status(response, file_id).await?;
        Ok(PushReceipt {
            applied_count: update.variable_count(),
        })
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

async fn check_status(response: Response, file_id: &str) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, retry_after, file_id, &body))
}

/// Map a failed HTTP status to the remote error taxonomy.
pub fn status_error(
    status: StatusCode,
    retry_after: Option<u64>,
    file_id: &str,
    body: &str,
) -> RemoteError {
    let detail = summarize(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth(detail),
        StatusCode::NOT_FOUND => RemoteError::NotFound(format!("file {file_id}: {detail}")),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited { retry_after },
        _ => RemoteError::Transport(detail),
    }
}

fn summarize(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {}", status.as_u16());
    }
    let mut end = body.len().min(MAX_ERROR_BODY);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("HTTP {}: {}", status.as_u16(), &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use dsync_types::{Token, TokenKind, TokenPath, TokenTree};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Mock {
        posted: Arc<Mutex<Vec<Value>>>,
    }

    fn authorized(headers: &AxumHeaders) -> bool {
        headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) == Some("good")
    }

    async fn local(
        State(_): State<Mock>,
        Path(file): Path<String>,
        headers: AxumHeaders,
    ) -> axum::response::Response {
        if !authorized(&headers) {
            return (AxumStatus::FORBIDDEN, "Invalid token").into_response();
        }
        match file.as_str() {
            "limited" => (AxumStatus::TOO_MANY_REQUESTS, [("retry-after", "42")], "").into_response(),
            "missing" => (AxumStatus::NOT_FOUND, "Not found").into_response(),
            _ => Json(json!({
                "status": 200,
                "error": false,
                "meta": {
                    "variableCollections": {
                        "VC:1": {"id": "VC:1", "name": "colors", "modes": [{"modeId": "1:0", "name": "Default"}],
                                 "defaultModeId": "1:0", "variableIds": ["V:1"]}
                    },
                    "variables": {
                        "V:1": {"id": "V:1", "name": "Primary", "variableCollectionId": "VC:1",
                                "resolvedType": "COLOR", "scopes": ["ALL_SCOPES"],
                                "valuesByMode": {"1:0": {"r": 1, "g": 0, "b": 0, "a": 1}}}
                    }
                }
            }))
            .into_response(),
        }
    }

    async fn write(
        State(mock): State<Mock>,
        headers: AxumHeaders,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, "").into_response();
        }
        mock.posted.lock().unwrap().push(body);
        Json(json!({"status": 200, "error": false, "meta": {"tempIdToRealId": {}}})).into_response()
    }

    async fn serve(mock: Mock) -> String {
        let app = Router::new()
            .route("/v1/files/:file/variables/local", get(local))
            .route("/v1/files/:file/variables", axum::routing::post(write))
            .with_state(mock);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str, token: &str) -> FigmaClient {
        FigmaClient::new(FigmaConfig::new(token).with_api_base(base)).unwrap()
    }

    #[test]
    fn construction_requires_a_token_and_http_base() {
        assert!(matches!(
            FigmaClient::new(FigmaConfig::default()),
            Err(FigmaError::MissingToken)
        ));
        assert!(matches!(
            FigmaClient::new(FigmaConfig::new("t").with_api_base("ftp://x")),
            Err(FigmaError::InvalidApiBase(_))
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, None, "f", ""),
            RemoteError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, None, "f", "Invalid token"),
            RemoteError::Auth(m) if m == "HTTP 403: Invalid token"
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None, "f", ""),
            RemoteError::NotFound(_)
        ));
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(5), "f", ""),
            RemoteError::RateLimited { retry_after: Some(5) }
        );
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None, "f", ""),
            RemoteError::Transport(m) if m == "HTTP 502"
        ));
    }

    #[tokio::test]
    async fn fetch_unwraps_meta() {
        let base = serve(Mock::default()).await;
        let raw = client(&base, "good").fetch_tokens("abc").await.unwrap();
        assert_eq!(raw.variables.len(), 1);
        assert_eq!(raw.variables["V:1"].name, "Primary");
    }

    #[tokio::test]
    async fn fetch_maps_failures() {
        let base = serve(Mock::default()).await;
        let err = client(&base, "bad").fetch_tokens("abc").await.unwrap_err();
        assert!(matches!(err, RemoteError::Auth(_)));

        let good = client(&base, "good");
        assert_eq!(
            good.fetch_tokens("limited").await.unwrap_err(),
            RemoteError::RateLimited { retry_after: Some(42) }
        );
        assert!(matches!(
            good.fetch_tokens("missing").await.unwrap_err(),
            RemoteError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn push_posts_actions() {
        let mock = Mock::default();
        let base = serve(mock.clone()).await;

        let mut tree = TokenTree::new();
        tree.insert(&TokenPath::new("spacing", "sm"), Token::new("8px", TokenKind::Dimension));
        let push = RemotePush {
            upserts: dsync_transform::to_design_tool(&tree, None).output,
            deletes: vec!["V:7".into()],
        };
        let receipt = client(&base, "good").push_tokens("abc", &push).await.unwrap();
        assert_eq!(receipt.applied_count, 2);

        let posted = mock.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        let actions: Vec<&str> = posted[0]["variables"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["CREATE", "DELETE"]);
        assert_eq!(posted[0]["variableModeValues"][0]["value"], json!(8));
    }
}
