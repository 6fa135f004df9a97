//! # TinyKV - An Embedded In-Memory Typed Key-Value Store
//!
//! TinyKV is a small, Redis-flavoured key-value store that lives inside your
//! process. There is no server and no wire protocol: you call methods on a
//! [`Store`] directly. It shows how such a store works inside: typed values,
//! TTLs, lazy and active expiry, and a single reader-writer lock.
//!
//! ## Features
//!
//! - **Typed Values**: strings, hashes, lists and sets, one shape per key
//! - **Type Safety**: an operation for the wrong shape fails, it never coerces
//! - **TTL Support**: any key can expire; expired keys are never observed
//! - **Thread Safe**: share an `Arc<Store>` between any number of threads
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              TinyKV                                     │
//! │                                                                         │
//! │  caller threads ──> Store (command methods)                             │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │         ┌──────────────────────────────────────────┐                   │
//! │         │            RwLock<Keyspace>              │                   │
//! │         │  ┌──────────────┐   ┌─────────────────┐  │                   │
//! │         │  │  ValueStore  │   │ ExpirationIndex │  │                   │
//! │         │  └──────────────┘   └─────────────────┘  │                   │
//! │         └──────────────────────────────────────────┘                   │
//! │                       ▲                                                 │
//! │                       │                                                 │
//! │         ┌─────────────┴───────────────────────────┐                    │
//! │         │            ActiveExpirer                │                    │
//! │         │       (Background OS thread)            │                    │
//! │         └─────────────────────────────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use tinykv::{start_active_expirer, Store, Ttl};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(Store::new());
//! let mut expirer = start_active_expirer(Arc::clone(&store)).unwrap();
//!
//! store.set("user:1000:name", "Alice");
//! store.hset("user:2000", "name", "Bob").unwrap();
//! store.sadd("tags", ["redis", "database", "cache"]).unwrap();
//!
//! store.expire("user:1000:name", Duration::from_secs(3)).unwrap();
//! assert!(matches!(store.ttl("user:1000:name"), Ttl::Remaining(_)));
//!
//! expirer.stop();
//! ```
//!
//! ## Supported Commands
//!
//! ### String Commands
//! - `SET key value` / `SET key value EX ttl` ([`Store::set`], [`Store::set_with_ttl`])
//! - `GET key`
//!
//! ### Hash Commands
//! - `HSET key field value`, `HGET key field`, `HGETALL key`
//!
//! ### List Commands
//! - `LPUSH key value [value ...]`, `RPOP key`, `LLEN key`
//!
//! ### Set Commands
//! - `SADD key member [member ...]`, `SMEMBERS key`
//!
//! ### Key Commands
//! - `DEL key`, `EXISTS key`, `TYPE key`
//! - `EXPIRE key ttl`, `TTL key`
//! - `KEYS *`, `DBSIZE`, `FLUSHDB`
//!
//! ## Module Overview
//!
//! - [`storage`]: The store, its value and expiry maps, and the active expirer
//! - [`error`]: Error types
//!
//! ## Lazy + Active Expiry
//!
//! Keys with TTL are expired in two ways:
//! 1. **Lazy**: When a key is accessed, we check if it's expired and delete it
//! 2. **Active**: A background thread periodically sweeps for expired keys
//!
//! Lazy expiry is what makes every operation correct; the sweep only
//! reclaims memory for keys nobody touches again.

pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use storage::{
    start_active_expirer, ActiveExpirer, ExpiryConfig, Store, StoreStats, Ttl, ValueKind,
};

/// Version of TinyKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
