//! Thread-Safe Store with Expiry Support
//!
//! This module implements the command surface of TinyKV. A [`Store`] owns a
//! [`ValueStore`] and an [`ExpirationIndex`] behind a single reader-writer lock.
//!
//! ## Design Decisions
//!
//! 1. **One Guard**: A single `RwLock` covers both maps, so every operation is
//!    linearizable. The whole keyspace is the critical section.
//! 2. **Lazy Expiry**: Every path checks the key's deadline first. An expired key
//!    is removed from both maps before the operation continues, so it is never
//!    observed as live.
//! 3. **Read Then Upgrade**: Reads take the lock shared. Only a read that finds
//!    an expired key retakes it exclusively to remove that key.
//! 4. **Active Expiry**: [`Store::sweep_expired`] reclaims keys nobody reads;
//!    the [`ActiveExpirer`](super::ActiveExpirer) calls it on a timer.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │                  RwLock<Keyspace>                     │  │
//! │  │  ┌──────────────────┐      ┌──────────────────────┐   │  │
//! │  │  │   ValueStore     │      │   ExpirationIndex    │   │  │
//! │  │  │ key → Value      │      │ key → Instant        │   │  │
//! │  │  └──────────────────┘      └──────────────────────┘   │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!        ▲ shared: GET HGET HGETALL SMEMBERS TTL KEYS DBSIZE
//!        ▲ exclusive: SET HSET LPUSH RPOP SADD DEL EXPIRE, sweeps
//! ```
//!
//! Sharding the keyspace into independently locked partitions would raise
//! write throughput, at the cost of the single total order above.

use crate::error::{Result, StoreError};
use crate::storage::expiration::{ExpirationIndex, Ttl};
use crate::storage::value::ValueKind;
use crate::storage::values::ValueStore;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Everything protected by the guard.
#[derive(Debug, Default)]
struct Keyspace {
    values: ValueStore,
    expirations: ExpirationIndex,
}

impl Keyspace {
    /// Removes `key` from both maps. Returns whether a value was stored.
    fn remove(&mut self, key: &str) -> bool {
        self.expirations.clear(key);
        self.values.remove(key).is_some()
    }

    /// Removes `key` if its deadline has passed.
    fn purge_if_expired(&mut self, key: &str, now: Instant) -> bool {
        if self.expirations.is_expired(key, now) {
            self.remove(key);
            true
        } else {
            false
        }
    }

    /// Removes every key whose deadline has passed.
    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired = self.expirations.expired(now);
        for key in &expired {
            self.remove(key);
            trace!(key = %key, "Key expired and deleted");
        }
        expired.len()
    }
}

/// An embedded, in-memory typed key-value store.
///
/// Keys map to strings, hashes, lists or sets. Any key can be given a TTL.
///
/// # Thread Safety
///
/// Designed to be wrapped in an `Arc` and shared across threads. All
/// operations are synchronous and run to completion under the guard.
///
/// # Example
///
/// ```
/// use tinykv::storage::{Store, Ttl};
/// use std::time::Duration;
///
/// let store = Store::new();
///
/// store.set("name", "Alice");
/// assert_eq!(store.get("name").unwrap(), Some("Alice".to_string()));
///
/// store.expire("name", Duration::from_secs(60)).unwrap();
/// assert!(matches!(store.ttl("name"), Ttl::Remaining(_)));
///
/// // A hash operation on a string key is rejected
/// assert!(store.hset("name", "first", "Alice").is_err());
/// ```
pub struct Store {
    keyspace: RwLock<Keyspace>,

    /// Statistics: read-shaped operations
    read_count: AtomicU64,

    /// Statistics: write-shaped operations
    write_count: AtomicU64,

    /// Statistics: DEL operations
    del_count: AtomicU64,

    /// Statistics: keys removed because their TTL passed
    expired_count: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("read_count", &self.read_count.load(Ordering::Relaxed))
            .field("write_count", &self.write_count.load(Ordering::Relaxed))
            .field("expired_count", &self.expired_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store. No background expiry runs until an
    /// [`ActiveExpirer`](super::ActiveExpirer) is started for it.
    pub fn new() -> Self {
        Self {
            keyspace: RwLock::new(Keyspace::default()),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // Guard discipline
    // ========================================================================

    /// Runs a read against a single key.
    ///
    /// Fast path under the shared lock. If the key turns out to be expired,
    /// the lock is retaken exclusively, the key removed, and the read answered
    /// against the cleaned keyspace.
    fn read_key<T>(&self, key: &str, op: impl FnOnce(&Keyspace) -> T) -> T {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        {
            let keyspace = self.keyspace.read();
            if !keyspace.expirations.is_expired(key, Instant::now()) {
                return op(&*keyspace);
            }
        }

        let mut keyspace = self.keyspace.write();
        self.expire_key(&mut keyspace, key);
        op(&*keyspace)
    }

    /// Runs a read over the whole keyspace, reclaiming expired keys first if
    /// there are any.
    fn read_all<T>(&self, op: impl FnOnce(&Keyspace) -> T) -> T {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        {
            let keyspace = self.keyspace.read();
            if !keyspace.expirations.any_expired(Instant::now()) {
                return op(&*keyspace);
            }
        }

        let mut keyspace = self.keyspace.write();
        self.expire_all(&mut keyspace);
        op(&*keyspace)
    }

    /// Runs a write against a single key under the exclusive lock, after
    /// removing the key if it has expired.
    fn write_key<T>(&self, key: &str, op: impl FnOnce(&mut Keyspace) -> T) -> T {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut keyspace = self.keyspace.write();
        self.expire_key(&mut keyspace, key);
        op(&mut *keyspace)
    }

    fn expire_key(&self, keyspace: &mut Keyspace, key: &str) -> bool {
        let expired = keyspace.purge_if_expired(key, Instant::now());
        if expired {
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Lazily expired key");
        }
        expired
    }

    fn expire_all(&self, keyspace: &mut Keyspace) -> usize {
        let expired = keyspace.purge_expired(Instant::now());
        if expired > 0 {
            self.expired_count
                .fetch_add(expired as u64, Ordering::Relaxed);
        }
        expired
    }

    // ========================================================================
    // STRING OPERATIONS
    // ========================================================================

    /// Sets a string value, replacing whatever was stored at `key`.
    ///
    /// Any TTL on the key is cleared.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        debug!(key = %key, value = %value, "SET");

        self.write_count.fetch_add(1, Ordering::Relaxed);
        let mut keyspace = self.keyspace.write();
        self.expire_key(&mut keyspace, &key);
        keyspace.expirations.clear(&key);
        keyspace.values.set(key, value);
    }

    /// Sets a string value that expires after `ttl`.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let (key, value) = (key.into(), value.into());
        debug!(key = %key, value = %value, ttl_ms = ttl.as_millis() as u64, "SET");

        self.write_count.fetch_add(1, Ordering::Relaxed);
        let mut keyspace = self.keyspace.write();
        self.expire_key(&mut keyspace, &key);
        keyspace.expirations.set(&key, Instant::now(), ttl);
        keyspace.values.set(key, value);
    }

    /// Gets a string value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.read_key(key, |ks| ks.values.get(key))?;
        debug!(key, found = value.is_some(), "GET");
        Ok(value)
    }

    // ========================================================================
    // HASH OPERATIONS
    // ========================================================================

    /// Sets a field in a hash, creating the hash if needed.
    ///
    /// # Returns
    /// `true` if the field is new. An existing TTL is kept.
    pub fn hset(
        &self,
        key: &str,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<bool> {
        let (field, value) = (field.into(), value.into());
        debug!(key, field = %field, value = %value, "HSET");
        self.write_key(key, |ks| ks.values.hset(key, field, value))
    }

    pub fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let value = self.read_key(key, |ks| ks.values.hget(key, field))?;
        debug!(key, field, found = value.is_some(), "HGET");
        Ok(value)
    }

    /// Returns a copy of every field in a hash.
    pub fn hgetall(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let hash = self.read_key(key, |ks| ks.values.hgetall(key))?;
        debug!(key, fields = ?hash.as_ref().map(HashMap::len), "HGETALL");
        Ok(hash)
    }

    // ========================================================================
    // LIST OPERATIONS
    // ========================================================================

    /// Pushes values to the head of a list, creating it if needed.
    ///
    /// The values keep their call order at the head: `LPUSH q x y z` on an
    /// empty key gives `[x, y, z]`, so successive `RPOP`s return `z`, `y`, `x`.
    ///
    /// # Returns
    /// The length of the list after the push.
    pub fn lpush<I, V>(&self, key: &str, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let pushed = values.len();
        let len = self.write_key(key, |ks| ks.values.lpush(key, values))?;
        debug!(key, pushed, len, "LPUSH");
        Ok(len)
    }

    /// Removes and returns the last element of a list.
    ///
    /// Returns `Ok(None)` if the list doesn't exist or is empty. A list
    /// emptied by this call stays live and keeps its TTL.
    pub fn rpop(&self, key: &str) -> Result<Option<String>> {
        let value = self.write_key(key, |ks| ks.values.rpop(key))?;
        debug!(key, value = ?value, "RPOP");
        Ok(value)
    }

    /// Length of a list, 0 if it doesn't exist.
    pub fn llen(&self, key: &str) -> Result<usize> {
        self.read_key(key, |ks| ks.values.llen(key))
    }

    // ========================================================================
    // SET OPERATIONS
    // ========================================================================

    /// Adds members to a set, creating it if needed.
    ///
    /// # Returns
    /// How many members were newly added. Members already present count 0.
    pub fn sadd<I, V>(&self, key: &str, members: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        let added = self.write_key(key, |ks| ks.values.sadd(key, members))?;
        debug!(key, added, "SADD");
        Ok(added)
    }

    /// Returns a copy of every member of a set. Order is unspecified.
    pub fn smembers(&self, key: &str) -> Result<Option<HashSet<String>>> {
        let members = self.read_key(key, |ks| ks.values.smembers(key))?;
        debug!(key, members = ?members.as_ref().map(HashSet::len), "SMEMBERS");
        Ok(members)
    }

    // ========================================================================
    // KEY OPERATIONS
    // ========================================================================

    /// Deletes a key of any type together with its TTL.
    ///
    /// # Returns
    /// `true` if a live key was deleted. Deleting a missing key is a no-op.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let existed = self.write_key(key, |ks| ks.remove(key));
        if existed {
            debug!(key, "DEL");
        }
        existed
    }

    /// Checks if a key exists (and is not expired).
    pub fn exists(&self, key: &str) -> bool {
        self.read_key(key, |ks| ks.values.contains(key))
    }

    /// Returns the kind of value stored at `key`, or `None` if absent.
    pub fn key_type(&self, key: &str) -> Option<ValueKind> {
        self.read_key(key, |ks| ks.values.kind(key))
    }

    /// Sets a TTL on an existing key, replacing any previous one.
    ///
    /// Fails with [`StoreError::InvalidTarget`] if the key doesn't exist.
    pub fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        self.write_key(key, |ks| {
            if !ks.values.contains(key) {
                return Err(StoreError::InvalidTarget(key.to_string()));
            }
            ks.expirations.set(key, Instant::now(), ttl);
            Ok(())
        })?;
        debug!(key, ttl_ms = ttl.as_millis() as u64, "EXPIRE");
        Ok(())
    }

    /// Reports how long a key has left to live.
    pub fn ttl(&self, key: &str) -> Ttl {
        self.read_key(key, |ks| {
            if !ks.values.contains(key) {
                return Ttl::Missing;
            }
            match ks.expirations.remaining(key, Instant::now()) {
                Some(left) => Ttl::Remaining(left),
                None => Ttl::Persistent,
            }
        })
    }

    /// Returns every live key. Order is unspecified.
    pub fn keys(&self) -> Vec<String> {
        let keys: Vec<String> = self.read_all(|ks| ks.values.keys().cloned().collect());
        debug!(count = keys.len(), "KEYS *");
        keys
    }

    /// Number of live keys (`DBSIZE`).
    pub fn len(&self) -> usize {
        self.read_all(|ks| ks.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key and every TTL.
    pub fn flush(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut keyspace = self.keyspace.write();
        keyspace.values.clear();
        keyspace.expirations.clear_all();
        debug!("FLUSHDB");
    }

    /// Removes every key whose TTL has passed.
    ///
    /// This is the body of one active-expiry sweep; it holds the exclusive lock
    /// for the whole scan.
    ///
    /// # Returns
    /// The number of keys reclaimed.
    pub fn sweep_expired(&self) -> usize {
        let mut keyspace = self.keyspace.write();
        self.expire_all(&mut keyspace)
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let (keys, volatile_keys) = {
            let keyspace = self.keyspace.read();
            (keyspace.values.len(), keyspace.expirations.len())
        };

        StoreStats {
            keys,
            volatile_keys,
            read_ops: self.read_count.load(Ordering::Relaxed),
            write_ops: self.write_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Keys currently held, including expired ones not yet reclaimed
    pub keys: usize,
    /// Keys carrying a TTL
    pub volatile_keys: usize,
    /// Total read-shaped operations
    pub read_ops: u64,
    /// Total write-shaped operations
    pub write_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Total keys removed by lazy or active expiry
    pub expired: u64,
}
