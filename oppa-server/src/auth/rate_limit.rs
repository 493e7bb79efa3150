//! Login throttling keyed on the client address
//!
//! The client address is the TCP peer unless the server runs behind
//! `trusted_proxies` reverse proxies. In that case it is the
//! `X-Forwarded-For` hop appended by the outermost trusted proxy. Hops to the
//! left of it are supplied by the client and never used as a key.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

pub const LOGIN_ATTEMPTS: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(60);

/// Key used when the peer address is unknown (no connect info)
const UNKNOWN_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    attempts: u32,
}

/// Fixed-window attempt counter per client address
#[derive(Clone)]
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    trusted_proxies: usize,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    /// Login limits, with `trusted_proxies` reverse proxies in front of the server
    pub fn new(trusted_proxies: usize) -> Self {
        Self::with_limit(LOGIN_ATTEMPTS, LOGIN_WINDOW, trusted_proxies)
    }

    pub fn with_limit(max_attempts: u32, window: Duration, trusted_proxies: usize) -> Self {
        Self {
            max_attempts,
            window,
            trusted_proxies,
            windows: Arc::default(),
        }
    }

    /// Address the limit applies to
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> IpAddr {
        let peer = peer.unwrap_or(UNKNOWN_PEER);
        if self.trusted_proxies == 0 {
            return peer;
        }

        let hops: Vec<&str> = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .collect();

        hops.len()
            .checked_sub(self.trusted_proxies)
            .and_then(|index| hops[index].parse().ok())
            .unwrap_or(peer)
    }

    /// Count an attempt; `false` once the client is over the limit
    pub async fn try_acquire(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(ip).or_insert(Window {
            opened: now,
            attempts: 0,
        });
        if now.duration_since(window.opened) >= self.window {
            *window = Window {
                opened: now,
                attempts: 0,
            };
        }
        window.attempts = window.attempts.saturating_add(1);
        window.attempts <= self.max_attempts
    }

    /// Drop windows that have run out
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| now.duration_since(window.opened) < self.window);
        let purged = before - windows.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired login windows removed");
        }
    }

    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Route layer on `/api/auth/login`
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let ip = state.rate_limiter.client_ip(request.headers(), peer);

    if !state.rate_limiter.try_acquire(ip).await {
        let tracked = state.rate_limiter.tracked().await;
        tracing::warn!(ip = %ip, tracked, "Login rate limit exceeded");
        return Err(AppError::new(ErrorCode::TooManyRequests).into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_ignored_without_trusted_proxy() {
        let limiter = RateLimiter::new(0);
        let headers = forwarded("203.0.113.9");
        assert_eq!(limiter.client_ip(&headers, Some(ip("10.0.0.5"))), ip("10.0.0.5"));
        assert_eq!(limiter.client_ip(&headers, None), UNKNOWN_PEER);
    }

    #[test]
    fn test_client_chosen_hops_ignored() {
        let limiter = RateLimiter::new(1);
        let peer = Some(ip("10.0.0.5"));
        for spoofed in ["1.1.1.1", "2.2.2.2, 3.3.3.3"] {
            let headers = forwarded(&format!("{spoofed}, 198.51.100.7"));
            assert_eq!(limiter.client_ip(&headers, peer), ip("198.51.100.7"));
        }

        let two_proxies = RateLimiter::new(2);
        let headers = forwarded("1.1.1.1, 198.51.100.7, 10.0.0.2");
        assert_eq!(two_proxies.client_ip(&headers, peer), ip("198.51.100.7"));
    }

    #[test]
    fn test_short_or_garbled_header_falls_back_to_peer() {
        let limiter = RateLimiter::new(2);
        let peer = Some(ip("10.0.0.5"));
        assert_eq!(limiter.client_ip(&forwarded("198.51.100.7"), peer), ip("10.0.0.5"));
        assert_eq!(limiter.client_ip(&HeaderMap::new(), peer), ip("10.0.0.5"));

        let limiter = RateLimiter::new(1);
        assert_eq!(limiter.client_ip(&forwarded("not-an-ip"), peer), ip("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_attempts_limited_per_client() {
        let limiter = RateLimiter::new(0);
        for _ in 0..LOGIN_ATTEMPTS {
            assert!(limiter.try_acquire(ip("10.0.0.1")).await);
        }
        assert!(!limiter.try_acquire(ip("10.0.0.1")).await);
        assert!(limiter.try_acquire(ip("10.0.0.2")).await);
    }

    #[tokio::test]
    async fn test_window_reopens_and_expired_windows_purged() {
        let limiter = RateLimiter::with_limit(1, Duration::from_millis(40), 0);
        assert!(limiter.try_acquire(ip("10.0.0.1")).await);
        assert!(!limiter.try_acquire(ip("10.0.0.1")).await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        limiter.purge_expired().await;
        assert_eq!(limiter.tracked().await, 0);
        assert!(limiter.try_acquire(ip("10.0.0.1")).await);
    }
}
