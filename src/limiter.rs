// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time-windowed submission throttle.
//!
//! Tracks the last admitted submission per identity key and refuses a key
//! until the cooldown window has elapsed. Expired entries are swept on
//! every call rather than by a background task, so under very low traffic
//! a stale entry can outlive the nominal window until the next call
//! triggers a sweep. That is the intended behaviour.

use crate::config::IdentitySource;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Per-identity cooldown table.
pub struct RateLimiter {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given cooldown window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Try to admit a submission for `key` now.
    pub async fn try_admit(&self, key: &str) -> bool {
        self.try_admit_at(key, Instant::now()).await
    }

    /// Clock-injected admission check.
    ///
    /// Sweep, membership check, and insert run under one lock so that two
    /// concurrent calls for the same key can never both be admitted within
    /// a window. A refusal leaves the stored timestamp untouched.
    pub async fn try_admit_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, admitted| now.saturating_duration_since(*admitted) < self.window);
        if entries.contains_key(key) {
            debug!(key, "cooldown active, submission refused");
            return false;
        }
        entries.insert(key.to_string(), now);
        true
    }
}

/// Derive the identity key the throttle is keyed by.
///
/// The default source is the peer address as the listener saw it; a header
/// source takes the raw header value. Requests missing a configured header
/// all share the empty-string key.
pub fn identity_key(source: &IdentitySource, peer: &SocketAddr, headers: &HeaderMap) -> String {
    match source {
        IdentitySource::Default => peer.ip().to_string(),
        IdentitySource::Header(name) => headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const WINDOW: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn second_attempt_within_window_is_refused() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();

        assert!(limiter.try_admit_at("10.0.0.1", start).await);
        assert!(!limiter.try_admit_at("10.0.0.1", start + Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn refusal_does_not_extend_the_window() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();

        assert!(limiter.try_admit_at("10.0.0.1", start).await);
        // Refused halfway through; the original timestamp must stand, so
        // the key frees up a full window after the first admission.
        assert!(!limiter.try_admit_at("10.0.0.1", start + Duration::from_secs(150)).await);
        assert!(
            limiter
                .try_admit_at("10.0.0.1", start + WINDOW + Duration::from_secs(1))
                .await
        );
    }

    #[tokio::test]
    async fn sweep_from_any_key_evicts_expired_entries() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();

        assert!(limiter.try_admit_at("10.0.0.1", start).await);
        // A call for an unrelated key past the window sweeps the table.
        assert!(
            limiter
                .try_admit_at("10.0.0.2", start + WINDOW + Duration::from_secs(1))
                .await
        );
        assert!(
            limiter
                .try_admit_at("10.0.0.1", start + WINDOW + Duration::from_secs(2))
                .await
        );
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let limiter = RateLimiter::new(WINDOW);
        let start = Instant::now();

        assert!(limiter.try_admit_at("10.0.0.1", start).await);
        assert!(limiter.try_admit_at("10.0.0.2", start).await);
    }

    #[tokio::test]
    async fn concurrent_requests_admit_only_one() {
        let limiter = std::sync::Arc::new(RateLimiter::new(WINDOW));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.try_admit("10.0.0.1").await }));
        }
        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[test]
    fn identity_key_default_uses_peer_ip() {
        let peer: SocketAddr = "192.0.2.7:51234".parse().unwrap();
        let key = identity_key(&IdentitySource::Default, &peer, &HeaderMap::new());
        assert_eq!(key, "192.0.2.7");
    }

    #[test]
    fn identity_key_header_uses_raw_value() {
        let peer: SocketAddr = "192.0.2.7:51234".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-IP", HeaderValue::from_static("203.0.113.9"));
        let source = IdentitySource::Header("X-Real-IP".to_string());
        assert_eq!(identity_key(&source, &peer, &headers), "203.0.113.9");
    }

    #[test]
    fn missing_identity_header_shares_one_bucket() {
        let peer: SocketAddr = "192.0.2.7:51234".parse().unwrap();
        let source = IdentitySource::Header("X-Real-IP".to_string());
        assert_eq!(identity_key(&source, &peer, &HeaderMap::new()), "");
    }
}
