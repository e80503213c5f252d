use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by caller identity. Stale keys are
/// pruned opportunistically so the map does not grow with one-off callers.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    inner: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl RequestLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.inner.lock();

        guard.retain(|_, stamps| {
            stamps.retain(|at| now.duration_since(*at) <= self.window);
            !stamps.is_empty()
        });

        let stamps = guard.entry(key.to_string()).or_default();
        if stamps.len() >= self.max_requests {
            return false;
        }

        stamps.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_within_the_window() {
        let limiter = RequestLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.allow("caller"));
        assert!(limiter.allow("caller"));
        assert!(!limiter.allow("caller"));
        assert!(limiter.allow("other"));
    }
}
