//! In-memory sliding-window rate limiter keyed by client identifier.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-client sliding window over request timestamps.
///
/// State is process-local: it resets on restart and provides no isolation
/// between instances. Entries are pruned lazily on each check.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    table: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `client_id`; returns false when over quota.
    pub fn check(&self, client_id: &str) -> bool {
        self.check_at(client_id, Instant::now())
    }

    fn check_at(&self, client_id: &str, now: Instant) -> bool {
        let mut table = self.table.lock().unwrap();
        let timestamps = table.entry(client_id.to_string()).or_default();

        let window = self.window;
        timestamps.retain(|&t| now.saturating_duration_since(t) < window);

        if timestamps.len() >= self.max_requests {
            return false;
        }
        timestamps.push(now);
        true
    }
}
