//! Gateway configuration and credential files.

use crate::error::{GtmError, GtmResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the Tag Manager API, including the version segment.
    pub api_base_url: String,
    /// Base URL for Google OAuth2 (e.g. `https://oauth2.googleapis.com`).
    pub oauth_base_url: String,
    /// OAuth2 client ID, needed to refresh access tokens.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Per-request timeout (in seconds).
    pub timeout_secs: u64,
    /// Client-side request budget.
    pub rate_limit: RateLimitConfig,
    /// Backoff policy for transient failures.
    pub retry: RetryConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://tagmanager.googleapis.com/tagmanager/v2".to_string(),
            oauth_base_url: "https://oauth2.googleapis.com".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 60,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> GtmResult<Self> {
        read_json(path.as_ref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// At most `calls` requests per sliding window of `period_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub calls: usize,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            calls: 24,
            period_secs: 100,
        }
    }
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

/// Exponential backoff for backend errors and rate-limit responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,
    pub backend_base_delay_ms: u64,
    pub backend_max_delay_ms: u64,
    pub rate_limit_base_delay_ms: u64,
    pub rate_limit_max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backend_base_delay_ms: 1_000,
            backend_max_delay_ms: 10_000,
            rate_limit_base_delay_ms: 10_000,
            rate_limit_max_delay_ms: 100_000,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based) for a retryable error.
    pub fn backoff(&self, attempt: u32, rate_limited: bool) -> Duration {
        let (base, max) = if rate_limited {
            (self.rate_limit_base_delay_ms, self.rate_limit_max_delay_ms)
        } else {
            (self.backend_base_delay_ms, self.backend_max_delay_ms)
        };
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        Duration::from_millis(base.saturating_mul(factor).min(max))
    }
}

/// Stored OAuth2 credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Overrides [`GatewayConfig::client_id`] when set.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Overrides [`GatewayConfig::client_secret`] when set.
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl CredentialsFile {
    pub fn from_file(path: impl AsRef<Path>) -> GtmResult<Self> {
        read_json(path.as_ref())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> GtmResult<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GtmError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| GtmError::Config(format!("cannot parse {}: {e}", path.display())))
}
