//! Storage Module
//!
//! This module provides the whole of TinyKV's storage: a typed key-value map,
//! an expiration index, the lock that guards both, and a background expirer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                               │
//! │            RwLock<ValueStore + ExpirationIndex>             │
//! │   lazy expiry on every GET / SET / HSET / LPUSH / TTL ...   │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │ sweep_expired()
//!              ┌─────────────┴─────────────┐
//!              │      ActiveExpirer        │
//!              │  (Background OS thread)   │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tinykv::storage::{start_active_expirer, Store};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(Store::new());
//! let _expirer = start_active_expirer(Arc::clone(&store)).unwrap();
//!
//! store.lpush("queue", ["task1", "task2", "task3"]).unwrap();
//! assert_eq!(store.rpop("queue").unwrap(), Some("task3".to_string()));
//!
//! store.set_with_ttl("session", "token123", Duration::from_secs(3600));
//! assert!(store.exists("session"));
//! ```

pub mod engine;
pub mod expiration;
pub mod expiry;
pub mod value;
pub mod values;

// Re-export commonly used types
pub use engine::{Store, StoreStats};
pub use expiration::{ExpirationIndex, Ttl};
pub use expiry::{start_active_expirer, ActiveExpirer, ExpiryConfig};
pub use value::{Value, ValueKind};
pub use values::ValueStore;
