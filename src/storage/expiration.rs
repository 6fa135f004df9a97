//! Expiration index: key → absolute deadline.
//!
//! A key without a record never expires. A key whose deadline is at or before
//! "now" is gone, even if its value has not been reclaimed yet.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Longest TTL honoured; larger requests are clamped so the deadline stays
/// representable as an `Instant`.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Remaining lifetime of a key, as reported by `TTL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key is live and expires after this duration
    Remaining(Duration),
    /// The key is live and has no expiry
    Persistent,
    /// The key does not exist (or has already expired)
    Missing,
}

impl Ttl {
    /// Integer rendering used by the `TTL` command.
    ///
    /// - `-2` if the key does not exist
    /// - `-1` if the key exists but has no expiry
    /// - otherwise the whole seconds remaining
    pub fn as_secs(&self) -> i64 {
        match self {
            Ttl::Remaining(left) => left.as_secs() as i64,
            Ttl::Persistent => -1,
            Ttl::Missing => -2,
        }
    }
}

/// Tracks when each key with a TTL expires.
#[derive(Debug, Default)]
pub struct ExpirationIndex {
    deadlines: HashMap<String, Instant>,
}

impl ExpirationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys carrying a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Records (or replaces) the deadline for `key` as `now + ttl`.
    pub fn set(&mut self, key: &str, now: Instant, ttl: Duration) {
        let deadline = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        self.deadlines.insert(key.to_string(), deadline);
    }

    /// Drops the record for `key`, returning whether one existed.
    pub fn clear(&mut self, key: &str) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn clear_all(&mut self) {
        self.deadlines.clear();
    }

    /// Checks whether `key` has a deadline that has passed.
    #[inline]
    pub fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.deadlines
            .get(key)
            .map(|deadline| now >= *deadline)
            .unwrap_or(false)
    }

    /// Time left before `key` expires, or `None` if it has no record.
    pub fn remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        self.deadlines
            .get(key)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns true if any recorded deadline has passed.
    pub fn any_expired(&self, now: Instant) -> bool {
        self.deadlines.values().any(|deadline| now >= *deadline)
    }

    /// Collects every key whose deadline has passed. Order is unspecified.
    pub fn expired(&self, now: Instant) -> Vec<String> {
        self.deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let mut index = ExpirationIndex::new();
        let now = Instant::now();

        index.set("k", now, Duration::ZERO);
        assert!(index.is_expired("k", now));
        assert_eq!(index.expired(now), vec!["k".to_string()]);
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut index = ExpirationIndex::new();
        let now = Instant::now();

        index.set("k", now, Duration::from_secs(10));
        assert_eq!(index.remaining("k", now), Some(Duration::from_secs(10)));
        assert_eq!(
            index.remaining("k", now + Duration::from_secs(4)),
            Some(Duration::from_secs(6))
        );
        assert!(!index.is_expired("k", now + Duration::from_secs(9)));
        assert!(index.is_expired("k", now + Duration::from_secs(10)));
    }

    #[test]
    fn test_unrecorded_key_never_expires() {
        let index = ExpirationIndex::new();
        let later = Instant::now() + Duration::from_secs(3600);

        assert!(!index.is_expired("k", later));
        assert_eq!(index.remaining("k", later), None);
        assert!(!index.any_expired(later));
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let mut index = ExpirationIndex::new();
        let now = Instant::now();

        index.set("k", now, Duration::MAX);
        assert_eq!(index.remaining("k", now), Some(MAX_TTL));
    }

    #[test]
    fn test_set_replaces_and_clear_removes() {
        let mut index = ExpirationIndex::new();
        let now = Instant::now();

        index.set("k", now, Duration::ZERO);
        index.set("k", now, Duration::from_secs(60));
        assert!(!index.is_expired("k", now));
        assert_eq!(index.len(), 1);

        assert!(index.clear("k"));
        assert!(!index.clear("k"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_ttl_as_secs() {
        assert_eq!(Ttl::Missing.as_secs(), -2);
        assert_eq!(Ttl::Persistent.as_secs(), -1);
        assert_eq!(Ttl::Remaining(Duration::from_millis(2999)).as_secs(), 2);
    }
}
