//! OAuth2 bearer session of the REST gateway.

use super::http::transport_error;
use crate::config::GatewayConfig;
use crate::error::{GtmError, GtmResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Access tokens are renewed this long before the server says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct Tokens {
    access: String,
    refresh: Option<String>,
    expires_at: Option<SystemTime>,
}

impl Tokens {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| SystemTime::now() >= at)
    }
}

/// Body of a successful `/token` response.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl TokenGrant {
    fn expires_at(&self, now: SystemTime) -> Option<SystemTime> {
        self.expires_in
            .map(|secs| now + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN))
    }
}

/// Tokens shared by every request of one gateway.
///
/// Refreshes happen under the write lock, so concurrent callers that find
/// the token expired trigger a single `/token` request.
#[derive(Debug, Default)]
pub(crate) struct Session {
    tokens: RwLock<Option<Tokens>>,
}

impl Session {
    /// A session from stored tokens. An empty access token counts as
    /// expired, so the first request refreshes it.
    pub fn new(access: String, refresh: Option<String>) -> Self {
        let expires_at = access.is_empty().then_some(SystemTime::UNIX_EPOCH);
        Self {
            tokens: RwLock::new(Some(Tokens {
                access,
                refresh,
                expires_at,
            })),
        }
    }

    pub async fn set(&self, access: String, refresh: Option<String>) {
        *self.tokens.write().await = Some(Tokens {
            access,
            refresh,
            expires_at: None,
        });
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// A valid access token, refreshed first when it has expired.
    pub async fn bearer(&self, client: &Client, config: &GatewayConfig) -> GtmResult<String> {
        if let Some(tokens) = self.tokens.read().await.as_ref().filter(|t| !t.is_expired()) {
            return Ok(tokens.access.clone());
        }

        let mut guard = self.tokens.write().await;
        let tokens = guard
            .as_mut()
            .ok_or_else(|| GtmError::Auth("not authenticated".to_string()))?;
        if !tokens.is_expired() {
            return Ok(tokens.access.clone());
        }
        let refresh = tokens.refresh.clone().ok_or_else(|| {
            GtmError::Auth("access token expired and no refresh token is available".to_string())
        })?;

        let grant = request_grant(client, config, &refresh).await?;
        tokens.expires_at = grant.expires_at(SystemTime::now());
        tokens.refresh = grant.refresh_token.or(Some(refresh));
        tokens.access = grant.access_token;
        info!("Access token refreshed");

        Ok(tokens.access.clone())
    }
}

async fn request_grant(
    client: &Client,
    config: &GatewayConfig,
    refresh_token: &str,
) -> GtmResult<TokenGrant> {
    debug!("Refreshing Tag Manager access token");
    let response = client
        .post(format!("{}/token", config.oauth_base_url.trim_end_matches('/')))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ])
        .send()
        .await
        .map_err(transport_error("token refresh".to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GtmError::Auth(format!(
            "token refresh rejected with {status}: {}",
            body.trim()
        )));
    }
    response
        .json()
        .await
        .map_err(|e| GtmError::Auth(format!("unreadable token response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_access_token_starts_expired() {
        let session = Session::new(String::new(), Some("refresh".to_string()));
        let guard = session.tokens.read().await;
        assert!(guard.as_ref().is_some_and(Tokens::is_expired));
    }

    #[tokio::test]
    async fn set_tokens_never_expire_on_their_own() {
        let session = Session::default();
        assert!(!session.is_authenticated().await);

        session.set("access".to_string(), None).await;
        assert!(session.is_authenticated().await);
        let guard = session.tokens.read().await;
        assert!(guard.as_ref().is_some_and(|t| !t.is_expired()));
    }

    #[test]
    fn grant_expiry_keeps_a_margin() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let grant = TokenGrant {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
        };
        assert_eq!(grant.expires_at(now), Some(now + Duration::from_secs(3540)));

        let short = TokenGrant {
            expires_in: Some(30),
            ..grant
        };
        assert_eq!(short.expires_at(now), Some(now));
    }
}
