//! Token bucket shared by every Discord call made by the process.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Longest single sleep while waiting for a token
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Configuration for the shared Discord request budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Sustained request rate.
    pub requests_per_second: f64,
    /// Requests that can be made back to back before pacing starts.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5.0,
            burst_size: 5,
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_update: Instant,
}

/// Async token bucket. Callers wait for a token instead of being rejected.
#[derive(Debug)]
pub struct TokenBucket {
    config: RateLimitConfig,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BucketState {
                tokens: f64::from(config.burst_size.max(1)),
                last_update: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_update).as_secs_f64();
        state.last_update = now;

        let capacity = f64::from(self.config.burst_size.max(1));
        state.tokens = (state.tokens + elapsed * self.config.requests_per_second).min(capacity);
    }

    /// Waits until a token is available and takes it.
    pub async fn acquire(&self) {
        if self.config.requests_per_second <= 0.0 {
            return;
        }

        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }

                let missing = 1.0 - state.tokens;
                Duration::try_from_secs_f64(missing / self.config.requests_per_second)
                    .map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT))
            };

            tokio::time::sleep(wait).await;
        }
    }
}
