//! Sliding-window request limiter.

use crate::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Allows at most `calls` acquisitions per sliding `period`.
#[derive(Debug)]
pub struct RateLimiter {
    calls: usize,
    period: Duration,
    sent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// A limit of zero calls disables limiting.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            calls: config.calls,
            period: config.period(),
            sent: Mutex::new(VecDeque::with_capacity(config.calls)),
        }
    }

    /// Waits until one more request fits in the window, then records it.
    pub async fn acquire(&self) {
        if self.calls == 0 {
            return;
        }

        loop {
            let wait = {
                let mut sent = self.sent.lock().await;
                let now = Instant::now();

                while let Some(&oldest) = sent.front() {
                    if now.duration_since(oldest) >= self.period {
                        sent.pop_front();
                    } else {
                        break;
                    }
                }

                match sent.front() {
                    Some(&oldest) if sent.len() >= self.calls => {
                        self.period.saturating_sub(now.duration_since(oldest))
                    }
                    _ => {
                        sent.push_back(now);
                        return;
                    }
                }
            }; // lock dropped here

            debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests recorded in the current window.
    pub async fn in_flight_window(&self) -> usize {
        self.sent.lock().await.len()
    }
}
