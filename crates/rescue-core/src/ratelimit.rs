//! Fixed-window request limiting per caller.
//!
//! Window state is a small JSON record `{count, reset}` stored under
//! `rate:<caller>` with a TTL equal to the window length. The read-modify-write
//! is not atomic: concurrent requests from one caller may each observe the
//! same count, so the limit is approximate under contention.
//!
//! The limiter fails open. A missing store, a store error or an unreadable
//! window record never blocks a request.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::store::{KvStore, keys};

/// Requests allowed per window, and the window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub limit: u32,
    pub window_secs: u64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            limit: 30,
            window_secs: 60,
        }
    }
}

/// Persisted counter for one caller's current window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
struct Window {
    count: u32,
    /// Unix seconds at which the window ends
    reset: i64,
}

impl Window {
    fn open(now: i64, policy: &RatePolicy) -> Self {
        Self {
            count: 0,
            reset: now.saturating_add_unsigned(policy.window_secs),
        }
    }
}

/// Fixed-window limiter over an optional key-value store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Option<Arc<dyn KvStore>>,
}

impl RateLimiter {
    /// Creates a limiter. Without a store every request is allowed.
    pub fn new(store: Option<Arc<dyn KvStore>>) -> Self {
        Self { store }
    }

    /// Returns whether `caller` may make another request now.
    pub async fn allow(&self, caller: &str, policy: &RatePolicy) -> bool {
        self.allow_at(caller, policy, Timestamp::now().as_second())
            .await
    }

    /// Same as [`allow`](Self::allow) with an explicit clock, in Unix seconds.
    pub async fn allow_at(&self, caller: &str, policy: &RatePolicy, now: i64) -> bool {
        let Some(store) = &self.store else {
            return true;
        };
        let key = keys::rate(caller);

        let stored = match store.get(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Rate limit store unavailable, allowing {caller}: {e}");
                return true;
            }
        };

        let mut window = stored
            .and_then(|raw| serde_json::from_str::<Window>(&raw).ok())
            .filter(|w| now <= w.reset)
            .unwrap_or_else(|| Window::open(now, policy));

        if window.count >= policy.limit {
            return false;
        }
        window.count += 1;

        let ttl = Duration::from_secs(policy.window_secs);
        let written = match serde_json::to_string(&window) {
            Ok(raw) => store.put(&key, &raw, Some(ttl)).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            warn!("Failed to persist rate window for {caller}: {e}");
        }
        true
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.store.is_some())
            .finish()
    }
}
