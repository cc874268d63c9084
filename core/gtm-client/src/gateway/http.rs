//! Tag Manager REST gateway.
//!
//! Maps [`GatewayCall`]s onto the Tag Manager API v2, authenticating with
//! OAuth2 bearer tokens. Every request passes through the sliding-window
//! [`RateLimiter`]; backend and quota failures are retried with exponential
//! backoff before being surfaced.

use super::call::{Gateway, GatewayCall, Operation};
use super::limiter::RateLimiter;
use super::session::Session;
use crate::config::{CredentialsFile, GatewayConfig};
use crate::error::{GtmError, GtmResult};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Marker text of the 404 returned for containers that never published.
pub const NO_LIVE_VERSION_MESSAGE: &str = "Published container version not found";
/// Marker text of quota exhaustion responses.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Quota exceeded for quota group";
/// Marker text of transient backend failures.
pub const BACKEND_ERROR_MESSAGE: &str = "Backend Error";

/// Gateway backed by the Tag Manager REST API.
pub struct HttpGateway {
    config: GatewayConfig,
    client: Client,
    session: Session,
    limiter: RateLimiter,
}

impl HttpGateway {
    /// Creates an unauthenticated gateway. Call [`HttpGateway::set_tokens`]
    /// before executing calls.
    pub fn new(config: GatewayConfig) -> GtmResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let limiter = RateLimiter::new(&config.rate_limit);

        Ok(Self {
            config,
            client,
            session: Session::default(),
            limiter,
        })
    }

    /// Creates a gateway from stored credentials. Client id and secret in
    /// the credentials file take precedence over the config.
    pub fn from_credentials(
        mut config: GatewayConfig,
        credentials: CredentialsFile,
    ) -> GtmResult<Self> {
        if credentials.access_token.is_empty() && credentials.refresh_token.is_none() {
            return Err(GtmError::Config(
                "credentials carry neither an access token nor a refresh token".to_string(),
            ));
        }
        if let Some(client_id) = credentials.client_id {
            config.client_id = client_id;
        }
        if let Some(client_secret) = credentials.client_secret {
            config.client_secret = client_secret;
        }

        Ok(Self {
            session: Session::new(credentials.access_token, credentials.refresh_token),
            ..Self::new(config)?
        })
    }

    /// Installs tokens obtained elsewhere. They are used until the API
    /// rejects them.
    pub async fn set_tokens(&self, access_token: String, refresh_token: Option<String>) {
        self.session.set(access_token, refresh_token).await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Builds the request URL for a call.
    fn url(&self, call: &GatewayCall) -> String {
        let base = self.config.api_base_url.trim_end_matches('/');
        let path = call.path.trim_matches('/');
        let resource = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        match &call.operation {
            Operation::Get | Operation::Update | Operation::Delete => resource,
            Operation::List { collection, .. } | Operation::Create { collection } => {
                format!("{resource}/{collection}")
            }
            Operation::Publish => format!("{resource}:publish"),
            Operation::Sync => format!("{resource}:sync"),
            Operation::GetStatus => format!("{resource}/status"),
            Operation::QuickPreview => format!("{resource}:quick_preview"),
            Operation::CreateVersion => format!("{resource}:create_version"),
            Operation::LiveVersion => format!("{resource}/versions:live"),
            Operation::CreateBuiltIns | Operation::DeleteBuiltIns => {
                format!("{resource}/built_in_variables")
            }
        }
    }

    fn method(operation: &Operation) -> Method {
        match operation {
            Operation::Get
            | Operation::List { .. }
            | Operation::GetStatus
            | Operation::LiveVersion => Method::GET,
            Operation::Update => Method::PUT,
            Operation::Delete | Operation::DeleteBuiltIns => Method::DELETE,
            Operation::Create { .. }
            | Operation::Publish
            | Operation::Sync
            | Operation::QuickPreview
            | Operation::CreateVersion
            | Operation::CreateBuiltIns => Method::POST,
        }
    }

    /// Sends one HTTP request and decodes the response.
    async fn send_once(&self, call: &GatewayCall, page_token: Option<&str>) -> GtmResult<Value> {
        let access_token = self.session.bearer(&self.client, &self.config).await?;

        let mut request = self
            .client
            .request(Self::method(&call.operation), self.url(call))
            .bearer_auth(&access_token);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(transport_error(format!("{} {}", call.operation.name(), call.path)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(transport_error(format!("reading {}", call.path)))?;

        if !status.is_success() {
            return Err(classify(status, retry_after, &text, &call.path));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Sends a request, retrying transient failures.
    async fn send_with_retry(
        &self,
        call: &GatewayCall,
        page_token: Option<&str>,
    ) -> GtmResult<Value> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire().await;

            match self.send_once(call, page_token).await {
                Err(err) if err.is_retryable() && attempt < self.config.retry.max_attempts => {
                    let mut delay = self.config.retry.backoff(attempt, err.is_rate_limited());
                    if let Some(after) = err.retry_after() {
                        delay = delay.max(after);
                    }
                    warn!(
                        "{} {} failed (attempt {}): {}; retrying in {:?}",
                        call.operation.name(),
                        call.path,
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// Follows `nextPageToken` and concatenates the listed items.
    async fn list_all(&self, call: &GatewayCall, item_field: &str) -> GtmResult<Value> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.send_with_retry(call, page_token.as_deref()).await?;
            match page.get(item_field) {
                Some(Value::Array(page_items)) => items.extend(page_items.iter().cloned()),
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(GtmError::Api {
                        status: 200,
                        message: format!("'{item_field}' in list response is not a list"),
                    });
                }
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        debug!("Listed {} {} under {}", items.len(), item_field, call.path);
        let mut result = Map::new();
        result.insert(item_field.to_string(), Value::Array(items));
        Ok(Value::Object(result))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn execute(&self, call: GatewayCall) -> GtmResult<Value> {
        debug!("{} {}", call.operation.name(), call.path);
        match call.operation {
            Operation::List { item_field, .. } => self.list_all(&call, item_field).await,
            _ => self.send_with_retry(&call, None).await,
        }
    }
}

/// Wraps a request that never produced a response.
pub(super) fn transport_error(context: String) -> impl FnOnce(reqwest::Error) -> GtmError {
    move |err| GtmError::Transport(format!("{context} failed: {err}"))
}

/// Maps a failed response onto the error taxonomy.
pub fn classify(status: StatusCode, retry_after: Option<u64>, body: &str, path: &str) -> GtmError {
    let message = error_message(body);

    if status == StatusCode::NOT_FOUND {
        if body.contains(NO_LIVE_VERSION_MESSAGE) {
            return GtmError::NoLiveVersion(path.to_string());
        }
        return GtmError::NotFound {
            name: path.to_string(),
            parent: parent_of(path).to_string(),
        };
    }
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains(QUOTA_EXCEEDED_MESSAGE) {
        return GtmError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(0),
        };
    }
    if status.is_server_error() || body.contains(BACKEND_ERROR_MESSAGE) {
        return GtmError::BackendUnavailable(message);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return GtmError::Unauthorized(message);
    }
    GtmError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Extracts `error.message` from a Google API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn parent_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rmatch_indices('/').nth(1) {
        Some((index, _)) => &trimmed[..index],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn classifies_missing_live_version() {
        let body = r#"{"error":{"code":404,"message":"Published container version not found"}}"#;
        let err = classify(StatusCode::NOT_FOUND, None, body, "accounts/1/containers/2");
        assert!(matches!(err, GtmError::NoLiveVersion(p) if p == "accounts/1/containers/2"));
    }

    #[test]
    fn classifies_plain_404_as_not_found() {
        let err = classify(StatusCode::NOT_FOUND, None, "", "accounts/1/containers/2/workspaces/9");
        match err {
            GtmError::NotFound { name, parent } => {
                assert_eq!(name, "accounts/1/containers/2/workspaces/9");
                assert_eq!(parent, "accounts/1/containers/2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quota_message_is_rate_limited_regardless_of_status() {
        let body = r#"{"error":{"code":403,"message":"Quota exceeded for quota group 'default'"}}"#;
        let err = classify(StatusCode::FORBIDDEN, Some(7), body, "accounts/1");
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn server_errors_are_backend_unavailable() {
        let err = classify(StatusCode::SERVICE_UNAVAILABLE, None, "{}", "accounts/1");
        assert!(matches!(err, GtmError::BackendUnavailable(_)));
        assert!(err.is_retryable());

        let err = classify(StatusCode::BAD_REQUEST, None, "Backend Error", "accounts/1");
        assert!(matches!(err, GtmError::BackendUnavailable(_)));
    }

    #[test]
    fn other_failures_keep_status_and_message() {
        let body = r#"{"error":{"code":400,"message":"Invalid parameter"}}"#;
        match classify(StatusCode::BAD_REQUEST, None, body, "accounts/1") {
            GtmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid parameter");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parent_of_strips_collection_and_id() {
        assert_eq!(parent_of("accounts/1/containers/2"), "accounts/1");
        assert_eq!(parent_of("accounts/1"), "");
        assert_eq!(parent_of(""), "");
    }
}
