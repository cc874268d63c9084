//! Error types for the client layer.

use gtm_model::ModelError;
use std::time::Duration;
use thiserror::Error;

/// Result type for client operations.
pub type GtmResult<T> = Result<T, GtmError>;

/// Errors that can occur while navigating or mutating the resource tree.
#[derive(Debug, Error)]
pub enum GtmError {
    /// A remote resource or a by-name lookup missed.
    #[error("{name:?} not found in {parent:?}")]
    NotFound { name: String, parent: String },

    /// The container has never published a version.
    #[error("no live version published for {0}")]
    NoLiveVersion(String),

    /// The remote quota was exhausted.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The remote backend failed transiently.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The credentials were rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No usable credential handle.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Any other non-success response.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Version creation returned the failure sentinel.
    #[error("could not create a version from workspace {workspace}, see {url} for details")]
    PublishFailure { workspace: String, url: String },

    /// Invalid configuration or credentials file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The local model rejected a value before any remote call.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GtmError {
    /// Returns true if this error represents a rate-limit response.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GtmError::RateLimited { .. } => true,
            GtmError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 429),
            _ => false,
        }
    }

    /// Returns the retry-after duration if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GtmError::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }

    /// Whether the failure is transient and the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limited() || matches!(self, GtmError::BackendUnavailable(_))
    }

    /// Whether the failure comes from the transport or the credentials
    /// rather than from the addressed resource itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GtmError::RateLimited { .. }
                | GtmError::BackendUnavailable(_)
                | GtmError::Unauthorized(_)
                | GtmError::Auth(_)
                | GtmError::Transport(_)
                | GtmError::Http(_)
        )
    }
}
