//! Fixed-window rate limiting for the contact form.
//!
//! Each client key gets a window that opens on its first attempt and lasts
//! `window`. Up to `max_attempts` attempts are admitted per window; the
//! counter starts over once the window has elapsed.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_in: Duration,
    },
    Limited {
        limit: u32,
        reset_in: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// `RateLimit-*` headers, plus `Retry-After` when limited.
    pub fn headers(&self) -> HeaderMap {
        let (limit, remaining, reset_in) = match *self {
            Self::Allowed { limit, remaining, reset_in } => (limit, remaining, reset_in),
            Self::Limited { limit, reset_in } => (limit, 0, reset_in),
        };
        let reset_secs = ceil_secs(reset_in);

        let mut headers = HeaderMap::new();
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(reset_secs));
        if !self.is_allowed() {
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(reset_secs));
        }
        headers
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 { secs + 1 } else { secs }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    attempts: u32,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Record an attempt for `key` and decide whether it may proceed.
    pub async fn check(&self, key: IpAddr) -> RateLimitDecision {
        self.check_at(key, Instant::now()).await
    }

    pub async fn check_at(&self, key: IpAddr, now: Instant) -> RateLimitDecision {
        let RateLimitConfig { max_attempts, window } = self.config;

        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key).or_insert(Window {
            started: now,
            attempts: 0,
        });

        if now.saturating_duration_since(entry.started) >= window {
            entry.started = now;
            entry.attempts = 0;
        }

        entry.attempts = entry.attempts.saturating_add(1);
        let reset_in = window.saturating_sub(now.saturating_duration_since(entry.started));

        if entry.attempts > max_attempts {
            debug!(%key, attempts = entry.attempts, ?reset_in, "Rate limit exceeded");
            RateLimitDecision::Limited {
                limit: max_attempts,
                reset_in,
            }
        } else {
            RateLimitDecision::Allowed {
                limit: max_attempts,
                remaining: max_attempts - entry.attempts,
                reset_in,
            }
        }
    }

    /// Drop windows that have fully elapsed.
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await
    }

    pub async fn cleanup_at(&self, now: Instant) {
        let window = self.config.window;
        let mut windows = self.windows.lock().await;
        windows.retain(|_, w| now.saturating_duration_since(w.started) < window);
    }

    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Periodically evict expired windows. Runs until the task is dropped.
pub async fn run_cleanup_loop(state: AppState) {
    let period = state.limiter.config().window.max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        state.limiter.cleanup().await;
    }
}

/// Middleware gating a route on the peer address.
pub async fn limit_by_peer(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let decision = state.limiter.check(addr.ip()).await;
    let headers = decision.headers();

    let mut response = if decision.is_allowed() {
        next.run(req).await
    } else {
        warn!(ip = %addr.ip(), path = %req.uri().path(), "Request rate limited");
        ApiError::RateLimited.into_response()
    };

    response.headers_mut().extend(headers);
    response
}
