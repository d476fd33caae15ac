//! Per-IP sliding-window rate limiting.

use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Window over which the per-minute budget applies.
const WINDOW: Duration = Duration::from_secs(60);

/// Stale entries are dropped opportunistically at this cadence.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Thread-safe sliding-window limiter keyed by client IP.
pub struct RateLimiter {
    max_requests: u32,
    entries: Mutex<HashMap<IpAddr, Vec<Instant>>>,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiter {
    /// Limiter allowing `max_requests` per IP per minute.
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            entries: Mutex::new(HashMap::new()),
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Record a request attempt; `true` means allowed.
    pub fn check_request(&self, ip: IpAddr) -> bool {
        self.maybe_cleanup();

        let cutoff = Instant::now() - WINDOW;
        let mut entries = self.entries.lock();
        let timestamps = entries.entry(ip).or_default();
        timestamps.retain(|t| *t > cutoff);
        if timestamps.len() >= self.max_requests as usize {
            return false;
        }
        timestamps.push(Instant::now());
        true
    }

    /// Drop IPs with no requests inside the window.
    fn maybe_cleanup(&self) {
        let should_cleanup = self.last_cleanup.lock().elapsed() > CLEANUP_INTERVAL;
        if !should_cleanup {
            return;
        }
        let cutoff = Instant::now() - WINDOW;
        let mut entries = self.entries.lock();
        let mut last = self.last_cleanup.lock();
        if last.elapsed() > CLEANUP_INTERVAL {
            entries.retain(|_, timestamps| {
                timestamps.retain(|t| *t > cutoff);
                !timestamps.is_empty()
            });
            *last = Instant::now();
        }
    }
}

/// Middleware rejecting over-budget clients with 429.
pub async fn enforce(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.limiter.check_request(addr.ip()) {
        warn!("rate limited (ip={})", addr.ip());
        return (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded").into_response();
    }
    next.run(request).await
}
