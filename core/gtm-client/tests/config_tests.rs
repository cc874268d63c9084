use gtm_client::gateway::RateLimiter;
use gtm_client::{CredentialsFile, GatewayConfig, GtmError, RateLimitConfig, RetryConfig};
use std::io::Write;
use std::time::Duration;

// ── Config defaults ─────────────────────────────────────────────

#[test]
fn gateway_config_default() {
    let cfg = GatewayConfig::default();
    assert_eq!(cfg.api_base_url, "https://tagmanager.googleapis.com/tagmanager/v2");
    assert_eq!(cfg.oauth_base_url, "https://oauth2.googleapis.com");
    assert!(cfg.client_id.is_empty());
    assert_eq!(cfg.timeout(), Duration::from_secs(60));
    assert_eq!(cfg.rate_limit.calls, 24);
    assert_eq!(cfg.rate_limit.period(), Duration::from_secs(100));
    assert_eq!(cfg.retry.max_attempts, 6);
}

#[test]
fn gateway_config_serde_roundtrip() {
    let cfg = GatewayConfig {
        client_id: "my_id".to_string(),
        timeout_secs: 5,
        ..Default::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let deserialized: GatewayConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.client_id, "my_id");
    assert_eq!(deserialized.timeout_secs, 5);
}

// ── Files ────────────────────────────────────────────────────────

#[test]
fn partial_config_file_takes_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"client_id": "abc", "rate_limit": {{"calls": 5}}}}"#).unwrap();

    let cfg = GatewayConfig::from_file(file.path()).unwrap();

    assert_eq!(cfg.client_id, "abc");
    assert_eq!(cfg.rate_limit.calls, 5);
    assert_eq!(cfg.rate_limit.period_secs, 100);
    assert_eq!(cfg.api_base_url, GatewayConfig::default().api_base_url);
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GatewayConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, GtmError::Config(_)));
}

#[test]
fn malformed_credentials_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = CredentialsFile::from_file(file.path()).unwrap_err();
    assert!(matches!(err, GtmError::Config(_)));
}

#[test]
fn credentials_file_reads_tokens() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"access_token": "a", "refresh_token": "r", "client_secret": "s"}}"#
    )
    .unwrap();

    let credentials = CredentialsFile::from_file(file.path()).unwrap();

    assert_eq!(credentials.access_token, "a");
    assert_eq!(credentials.refresh_token.as_deref(), Some("r"));
    assert!(credentials.client_id.is_none());
    assert_eq!(credentials.client_secret.as_deref(), Some("s"));
}

// ── Backoff ──────────────────────────────────────────────────────

#[test]
fn backoff_doubles_and_caps() {
    let retry = RetryConfig::default();
    assert_eq!(retry.backoff(1, false), Duration::from_secs(1));
    assert_eq!(retry.backoff(2, false), Duration::from_secs(2));
    assert_eq!(retry.backoff(3, false), Duration::from_secs(4));
    assert_eq!(retry.backoff(10, false), Duration::from_secs(10));

    assert_eq!(retry.backoff(1, true), Duration::from_secs(10));
    assert_eq!(retry.backoff(4, true), Duration::from_secs(80));
    assert_eq!(retry.backoff(5, true), Duration::from_secs(100));
}

// ── Rate limiter ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn limiter_waits_for_the_window_to_slide() {
    let limiter = RateLimiter::new(&RateLimitConfig {
        calls: 2,
        period_secs: 100,
    });
    let start = tokio::time::Instant::now();

    limiter.acquire().await;
    limiter.acquire().await;
    assert!(start.elapsed() < Duration::from_secs(1));

    limiter.acquire().await;
    assert!(start.elapsed() >= Duration::from_secs(100));
    assert_eq!(limiter.in_flight_window().await, 1);
}

#[tokio::test]
async fn zero_calls_disables_the_limiter() {
    let limiter = RateLimiter::new(&RateLimitConfig {
        calls: 0,
        period_secs: 100,
    });
    for _ in 0..100 {
        limiter.acquire().await;
    }
    assert_eq!(limiter.in_flight_window().await, 0);
}
