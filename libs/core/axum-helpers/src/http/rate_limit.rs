//! Per-client request budget backed by `governor`.
//!
//! Each client IP gets a burst of `permits` requests; one permit is replenished
//! every `window / permits`. Requests without connection info share the
//! `"unknown"` bucket.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::{ConfigError, FromEnv, env_parse};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Try again later.";

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub permits: u32,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn new(permits: u32, window_secs: u64) -> Self {
        Self {
            permits,
            window_secs,
        }
    }

    pub fn quota(&self) -> Result<Quota, ConfigError> {
        let burst = NonZeroU32::new(self.permits).ok_or_else(|| ConfigError::ParseError {
            key: "RATE_LIMIT_PERMITS".to_string(),
            details: "must be greater than zero".to_string(),
        })?;

        let period = Duration::from_secs(self.window_secs) / self.permits;
        Quota::with_period(period)
            .map(|quota| quota.allow_burst(burst))
            .ok_or_else(|| ConfigError::ParseError {
                key: "RATE_LIMIT_WINDOW_SECS".to_string(),
                details: "window is too short for the configured permits".to_string(),
            })
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(20, 30)
    }
}

/// Environment variables:
/// - `RATE_LIMIT_PERMITS` (default: 20)
/// - `RATE_LIMIT_WINDOW_SECS` (default: 30)
impl FromEnv for RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            permits: env_parse("RATE_LIMIT_PERMITS", defaults.permits)?,
            window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", defaults.window_secs)?,
        };
        config.quota()?;
        Ok(config)
    }
}

/// Keyed limiter shared by every request through the middleware.
pub struct IpRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl IpRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            limiter: RateLimiter::keyed(config.quota()?),
        })
    }

    /// Consume one permit for `client`. Returns false when the budget is spent.
    pub fn check(&self, client: &str) -> bool {
        self.limiter.check_key(&client.to_string()).is_ok()
    }

    /// Drop buckets that have fully replenished.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

fn client_ip(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware rejecting clients over budget with `429 Too Many Requests`.
///
/// ```ignore
/// let limiter = Arc::new(IpRateLimiter::new(&RateLimitConfig::default())?);
/// let app = router.layer(middleware::from_fn_with_state(limiter, rate_limit));
/// ```
pub async fn rate_limit(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);

    if limiter.check(&client) {
        return next.run(request).await;
    }

    tracing::warn!(
        ip = %client,
        path = %request.uri().path(),
        "Rate limit exceeded"
    );
    AppError::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()).into_response()
}
