//! Login Rate Limiter
//!
//! Per-client sliding fixed window over login attempts. Counts attempts,
//! not failures: a correct password consumes an attempt the same as a
//! wrong one, which caps guessing throughput regardless of outcome.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::extractors::client_ip;
use crate::handlers::AppState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: u64 },
}

/// In-memory login rate limiter
///
/// The per-identity counters are the only mutable shared state in the
/// service; all mutation happens under the write lock.
pub struct LoginRateLimiter {
    window: Duration,
    max: u32,
    state: RwLock<HashMap<String, (u32, Instant)>>,
}

impl LoginRateLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            state: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            Duration::from_secs(config.rate_limit_window),
            config.rate_limit_max,
        )
    }

    /// Record an attempt for `client` and decide whether it may proceed
    pub async fn check(&self, client: &str) -> RateDecision {
        let mut state = self.state.write().await;
        let now = Instant::now();

        let (count, window_start) = state
            .entry(client.to_string())
            .or_insert((0, now));

        // Reset if window expired
        if now.duration_since(*window_start) > self.window {
            *count = 0;
            *window_start = now;
        }

        if *count >= self.max {
            let retry_after = self
                .window
                .checked_sub(now.duration_since(*window_start))
                .unwrap_or(Duration::ZERO)
                .as_secs();

            return RateDecision::Limited { retry_after };
        }

        *count += 1;
        RateDecision::Allowed
    }
}

/// Gate in front of the login route
///
/// A violation is rejected before it reaches the auth flow and leaves one
/// entry in the audit log.
pub async fn limit_login(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let client = client_ip(req.headers()).unwrap_or_else(|| "unknown".to_string());

    match state.limiter.check(&client).await {
        RateDecision::Allowed => Ok(next.run(req).await),
        RateDecision::Limited { retry_after } => {
            tracing::warn!(
                client = %client,
                method = %req.method(),
                path = %req.uri().path(),
                "Login rate limit exceeded"
            );

            state
                .audit
                .record(
                    "Too many login attempts",
                    req.method().as_str(),
                    req.uri().path(),
                    &client,
                )
                .await;

            Err(AuthError::RateLimited { retry_after })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sixth_attempt_in_window_is_limited() {
        let limiter = LoginRateLimiter::new(Duration::from_secs(60), 5);

        for _ in 0..5 {
            assert_eq!(limiter.check("203.0.113.9").await, RateDecision::Allowed);
        }

        assert!(matches!(
            limiter.check("203.0.113.9").await,
            RateDecision::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn identities_are_counted_separately() {
        let limiter = LoginRateLimiter::new(Duration::from_secs(60), 1);

        assert_eq!(limiter.check("a").await, RateDecision::Allowed);
        assert_eq!(limiter.check("b").await, RateDecision::Allowed);
        assert!(matches!(
            limiter.check("a").await,
            RateDecision::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let limiter = LoginRateLimiter::new(Duration::from_millis(40), 1);

        assert_eq!(limiter.check("a").await, RateDecision::Allowed);
        assert!(matches!(
            limiter.check("a").await,
            RateDecision::Limited { .. }
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(limiter.check("a").await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn retry_after_never_exceeds_the_window() {
        let limiter = LoginRateLimiter::new(Duration::from_secs(60), 1);
        limiter.check("a").await;

        if let RateDecision::Limited { retry_after } = limiter.check("a").await {
            assert!(retry_after <= 60);
        } else {
            panic!("expected limited");
        }
    }
}
