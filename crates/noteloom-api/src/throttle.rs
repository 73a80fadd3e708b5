use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Identity;

/// Above this many tracked users, expired windows are dropped on the next hit.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by user. A limit of 0 disables it.
pub struct RateLimiter {
    windows: Mutex<HashMap<Uuid, Window>>,
    max_requests: u32,
    period: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, period: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            period,
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Count one request for `key`. `Err` carries the seconds until the
    /// window resets.
    pub async fn hit(&self, key: Uuid) -> Result<(), u64> {
        self.hit_at(key, Instant::now()).await
    }

    async fn hit_at(&self, key: Uuid, now: Instant) -> Result<(), u64> {
        if self.max_requests == 0 {
            return Ok(());
        }

        let mut windows = self.windows.lock().await;
        if windows.len() > PRUNE_THRESHOLD {
            let period = self.period;
            windows.retain(|_, w| now.duration_since(w.started) < period);
        }

        let window = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.period {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let remaining = self.period.saturating_sub(now.duration_since(window.started));
            return Err(remaining.as_secs().max(1));
        }
        window.count += 1;
        Ok(())
    }
}

/// Per-user request limit. Runs inside `require_auth`, which supplies the
/// `Identity`.
pub async fn throttle(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(retry_after) = state.rate_limiter.hit(identity.user_id).await {
        warn!("Rate limit reached for user {}", identity.user_id);
        return Err(ApiError::TooManyRequests { retry_after });
    }
    Ok(next.run(req).await)
}
