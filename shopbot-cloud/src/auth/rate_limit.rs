//! Application-layer rate limiting for trial start

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Entries idle longer than this are dropped by [`RateLimiter::cleanup`]
const IDLE_CUTOFF_SECS: u64 = 300;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove idle entries
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(IDLE_CUTOFF_SECS);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Extract client IP: the last X-Forwarded-For hop, then the peer address.
///
/// The service runs behind one trusted load balancer, which appends the peer
/// it saw. Earlier entries come from the client and are ignored.
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(last) = val.rsplit(',').map(str::trim).find(|ip| !ip.is_empty())
    {
        return last.to_owned();
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Rate limit middleware for trial start: 3 requests/minute per IP
pub async fn trial_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check("trial_start", &ip, 3, 60).await {
        tracing::warn!(ip = %ip, "Trial start rate limited");
        return Err(AppError::new(ErrorCode::TooManyRequests).into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("trial_start", "10.0.0.1", 3, 60).await);
        }
        assert!(!limiter.check("trial_start", "10.0.0.1", 3, 60).await);
        // Other IPs and routes are tracked separately
        assert!(limiter.check("trial_start", "10.0.0.2", 3, 60).await);
        assert!(limiter.check("other", "10.0.0.1", 3, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("trial_start", "10.0.0.1", 1, 60).await);
        assert!(!limiter.check("trial_start", "10.0.0.1", 1, 60).await);

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("trial_start", "10.0.0.1", 1, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_idle_entries() {
        let limiter = RateLimiter::new();
        limiter.check("trial_start", "10.0.0.1", 3, 60).await;

        tokio::time::advance(std::time::Duration::from_secs(IDLE_CUTOFF_SECS + 1)).await;
        limiter.cleanup().await;

        assert!(limiter.inner.lock().await.is_empty());
    }

    fn forwarded(value: &str) -> Request {
        Request::builder()
            .header("x-forwarded-for", value)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_ip_uses_proxy_appended_hop() {
        assert_eq!(extract_ip(&forwarded("203.0.113.7, 10.0.0.1")), "10.0.0.1");
        assert_eq!(extract_ip(&forwarded("198.51.100.4")), "198.51.100.4");
        assert_eq!(extract_ip(&forwarded("198.51.100.4, ")), "198.51.100.4");

        let request = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&request), "unknown");
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_entries_share_one_bucket() {
        let limiter = RateLimiter::new();
        for spoofed in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
            let ip = extract_ip(&forwarded(&format!("{spoofed}, 203.0.113.9")));
            assert!(limiter.check("trial_start", &ip, 3, 60).await);
        }
        let ip = extract_ip(&forwarded("4.4.4.4, 203.0.113.9"));
        assert!(!limiter.check("trial_start", &ip, 3, 60).await);
    }
}
