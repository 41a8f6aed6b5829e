//! Core sliding-window rate limiter implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Default number of admitted requests per identifier per window.
pub const DEFAULT_QUOTA: usize = 5;
/// Default trailing window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// A sliding-window rate limiter keyed by caller identifier.
///
/// Each identifier carries the timestamps of its admitted requests within
/// the trailing window. The admission check prunes stale timestamps, counts
/// what remains, and admits the request only if the count is below the
/// quota. The decision is an exact sliding window, not a fixed bucket: a
/// request is admitted as soon as the earliest admitted timestamp has aged
/// out of the window.
///
/// This struct is thread-safe and can be shared across tasks. The whole
/// admission check for one call runs under a single lock so that racing
/// callers for the same identifier can never both observe a free slot.
pub struct SlidingWindowLimiter {
    /// Admitted request timestamps indexed by identifier
    histories: Mutex<HashMap<String, Vec<Instant>>>,
    /// Maximum admitted requests per identifier per window
    quota: usize,
    /// Trailing window length
    window: Duration,
}

impl SlidingWindowLimiter {
    /// Create a new limiter with the given quota and window.
    pub fn new(quota: usize, window: Duration) -> Self {
        Self {
            histories: Mutex::new(HashMap::new()),
            quota,
            window,
        }
    }

    /// Check whether a request from `identifier` is admitted.
    ///
    /// Returns `true` if the request is within quota, `false` if over. This
    /// never fails and performs no I/O.
    pub fn allow(&self, identifier: &str) -> bool {
        self.allow_at(identifier, Instant::now())
    }

    /// Admission check against an explicit observation time.
    ///
    /// Pruning happens on every call, including calls that end up rejected,
    /// so a history never grows unbounded under sustained rejected traffic.
    fn allow_at(&self, identifier: &str, now: Instant) -> bool {
        let mut histories = self.histories.lock().unwrap();
        let history = histories.entry(identifier.to_string()).or_default();

        // Drop everything at or before the window start. `checked_sub`
        // guards monotonic clocks younger than the window.
        if let Some(window_start) = now.checked_sub(self.window) {
            history.retain(|&t| t > window_start);
        }

        if history.len() >= self.quota {
            debug!(identifier, "Rate limit exceeded");
            return false;
        }

        history.push(now);
        trace!(
            identifier,
            used = history.len(),
            quota = self.quota,
            "Request admitted"
        );
        true
    }

    /// Get the number of stored timestamps for an identifier.
    ///
    /// Returns `None` if the identifier has never been seen. This read does
    /// not prune; it reports the history as stored.
    pub fn request_count(&self, identifier: &str) -> Option<usize> {
        let histories = self.histories.lock().unwrap();
        histories.get(identifier).map(|h| h.len())
    }

    /// Get the number of tracked identifiers, including those whose
    /// histories have been pruned down to empty.
    pub fn tracked_identifiers(&self) -> usize {
        let histories = self.histories.lock().unwrap();
        histories.len()
    }

    /// Clear all histories.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        let mut histories = self.histories.lock().unwrap();
        histories.clear();
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A base instant far enough from the clock's origin that subtracting
    /// a test window can never underflow.
    fn base() -> Instant {
        Instant::now() + Duration::from_secs(60 * 60)
    }

    #[test]
    fn test_quota_enforced_within_window() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(60));
        let t = base();

        for i in 0..5 {
            assert!(limiter.allow_at("1.2.3.4", t + Duration::from_secs(i)));
        }

        // The 6th request inside the same window is rejected
        assert!(!limiter.allow_at("1.2.3.4", t + Duration::from_secs(5)));
    }

    #[test]
    fn test_full_window_expiry_admits_again() {
        let window = Duration::from_secs(60);
        let limiter = SlidingWindowLimiter::new(5, window);
        let t = base();

        for _ in 0..5 {
            assert!(limiter.allow_at("1.2.3.4", t));
        }
        assert!(!limiter.allow_at("1.2.3.4", t + Duration::from_secs(59)));

        // Once the whole burst has aged out, the identifier starts fresh
        let later = t + window + Duration::from_millis(1);
        assert!(limiter.allow_at("1.2.3.4", later));
        assert_eq!(limiter.request_count("1.2.3.4"), Some(1));
    }

    #[test]
    fn test_partial_expiry_frees_one_slot() {
        let window = Duration::from_secs(60);
        let limiter = SlidingWindowLimiter::new(5, window);
        let t = base();

        // Five admissions, the first 10s earlier than the rest
        assert!(limiter.allow_at("1.2.3.4", t));
        for i in 0..4 {
            assert!(limiter.allow_at("1.2.3.4", t + Duration::from_secs(10 + i)));
        }

        // Only the earliest timestamp has aged out by check time
        let check = t + window + Duration::from_secs(5);
        assert!(limiter.allow_at("1.2.3.4", check));
        assert!(!limiter.allow_at("1.2.3.4", check + Duration::from_secs(1)));
    }

    #[test]
    fn test_window_boundary_is_strict() {
        let window = Duration::from_secs(60);
        let limiter = SlidingWindowLimiter::new(1, window);
        let t = base();

        assert!(limiter.allow_at("1.2.3.4", t));
        // Exactly window-length later the first timestamp is stale
        assert!(limiter.allow_at("1.2.3.4", t + window));
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(60));
        let t = base();

        for _ in 0..5 {
            assert!(limiter.allow_at("1.2.3.4", t));
        }
        assert!(!limiter.allow_at("1.2.3.4", t));

        // Exhausting one identifier leaves others untouched
        assert!(limiter.allow_at("5.6.7.8", t));
    }

    #[test]
    fn test_rejected_calls_still_prune() {
        let window = Duration::from_secs(60);
        let limiter = SlidingWindowLimiter::new(2, window);
        let t = base();

        assert!(limiter.allow_at("1.2.3.4", t));
        assert!(limiter.allow_at("1.2.3.4", t + Duration::from_secs(1)));
        assert!(!limiter.allow_at("1.2.3.4", t + Duration::from_secs(30)));
        assert_eq!(limiter.request_count("1.2.3.4"), Some(2));

        // A rejected call after the first admission expired still prunes it
        assert!(limiter.allow_at("1.2.3.4", t + window + Duration::from_millis(500)));
        assert_eq!(limiter.request_count("1.2.3.4"), Some(2));
    }

    #[test]
    fn test_empty_histories_are_retained() {
        let window = Duration::from_secs(60);
        let limiter = SlidingWindowLimiter::new(5, window);
        let t = base();

        assert!(limiter.allow_at("1.2.3.4", t));
        assert_eq!(limiter.tracked_identifiers(), 1);

        // Aged-out identifiers keep their (empty) map entry
        assert!(limiter.allow_at("5.6.7.8", t + window + Duration::from_secs(1)));
        assert_eq!(limiter.tracked_identifiers(), 2);
    }

    #[test]
    fn test_clear() {
        let limiter = SlidingWindowLimiter::default();
        assert!(limiter.allow("1.2.3.4"));
        assert_eq!(limiter.tracked_identifiers(), 1);

        limiter.clear();
        assert_eq!(limiter.tracked_identifiers(), 0);
    }

    #[test]
    fn test_concurrent_checks_never_exceed_quota() {
        let quota = 5;
        let limiter = Arc::new(SlidingWindowLimiter::new(quota, Duration::from_secs(60)));

        let handles: Vec<_> = (0..quota + 8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.allow("1.2.3.4"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(admitted, quota);
        assert_eq!(limiter.request_count("1.2.3.4"), Some(quota));
    }
}
