//! Background Active Expirer
//!
//! This module implements a background thread that periodically sweeps the
//! store for expired keys and removes them. This is called "active expiry" as
//! opposed to "lazy expiry" (which happens on access).
//!
//! ## Why Do We Need This?
//!
//! Lazy expiry decides what every operation sees, but a key that expires and is
//! never touched again would stay in memory forever. The sweep reclaims it.
//!
//! ## Design
//!
//! The expirer runs on its own OS thread and:
//! 1. Waits for the next tick (default: every 100ms) or a shutdown signal
//! 2. Takes the store's lock exclusively and removes every expired key
//! 3. Logs how many keys were reclaimed
//!
//! The sweep competes with client operations for the same lock, so its cost
//! grows with the number of keys carrying a TTL.

use crate::error::Result;
use crate::storage::Store;
use crossbeam::channel::{self, select, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Name given to the expirer thread.
pub const EXPIRER_THREAD_NAME: &str = "tinykv-expirer";

/// Configuration for the active expirer.
#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    /// Interval between sweeps (default: 100ms)
    pub interval: Duration,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
        }
    }
}

impl ExpiryConfig {
    /// Configuration with a custom sweep interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }
}

/// A handle to the running active expirer.
///
/// When this handle is dropped, the expirer thread is stopped and joined.
#[derive(Debug)]
pub struct ActiveExpirer {
    /// Dropping the sender wakes the thread and tells it to exit
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ActiveExpirer {
    /// Starts the active expirer on a background thread.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to sweep
    /// * `config` - Configuration for the expirer
    ///
    /// # Returns
    ///
    /// A handle that stops the expirer when [`stop`](Self::stop) is called or
    /// when it is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use tinykv::storage::{ActiveExpirer, ExpiryConfig, Store};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(Store::new());
    /// let mut expirer = ActiveExpirer::start(Arc::clone(&store), ExpiryConfig::default()).unwrap();
    ///
    /// // Expirer runs in the background...
    ///
    /// expirer.stop();
    /// assert!(!expirer.is_running());
    /// ```
    pub fn start(store: Arc<Store>, config: ExpiryConfig) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel::bounded(0);
        let interval = config.interval;

        let handle = thread::Builder::new()
            .name(EXPIRER_THREAD_NAME.to_string())
            .spawn(move || expirer_loop(store, config, shutdown_rx))?;

        info!(
            interval_ms = interval.as_millis() as u64,
            "Background active expirer started"
        );

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Returns true while the expirer thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stops the expirer and waits for its thread to exit.
    ///
    /// Safe to call more than once. This is called automatically when the
    /// handle is dropped.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        drop(self.shutdown_tx.take());

        if handle.join().is_err() {
            error!("Active expirer thread panicked");
            return;
        }
        info!("Background active expirer stopped");
    }
}

impl Drop for ActiveExpirer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main expirer loop.
fn expirer_loop(store: Arc<Store>, config: ExpiryConfig, shutdown_rx: Receiver<()>) {
    let ticker = channel::tick(config.interval);

    loop {
        // Wait for the next tick or the shutdown signal
        select! {
            recv(ticker) -> _ => {}
            recv(shutdown_rx) -> _ => {
                debug!("Active expirer received shutdown signal");
                return;
            }
        }

        let expired = store.sweep_expired();

        if expired > 0 {
            debug!(
                expired = expired,
                keys_remaining = store.stats().keys,
                "Expired keys reclaimed"
            );
        }
    }
}

/// Starts the active expirer with default configuration.
///
/// This is a convenience function for simple use cases.
pub fn start_active_expirer(store: Arc<Store>) -> Result<ActiveExpirer> {
    ActiveExpirer::start(store, ExpiryConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> ExpiryConfig {
        ExpiryConfig::with_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(ExpiryConfig::default().interval, Duration::from_millis(100));
    }

    #[test]
    fn test_expirer_reclaims_untouched_keys() {
        let store = Arc::new(Store::new());

        for i in 0..10 {
            store.set_with_ttl(format!("key{}", i), "value", Duration::from_millis(50));
        }
        store.set("persistent", "value");
        assert_eq!(store.stats().keys, 11);

        let _expirer = ActiveExpirer::start(Arc::clone(&store), fast_config()).unwrap();

        // Wait for keys to expire and be swept, without reading them
        thread::sleep(Duration::from_millis(200));

        let stats = store.stats();
        assert_eq!(stats.keys, 1);
        assert_eq!(stats.volatile_keys, 0);
        assert_eq!(stats.expired, 10);
        assert!(store.exists("persistent"));
    }

    #[test]
    fn test_expirer_stops_on_drop() {
        let store = Arc::new(Store::new());

        {
            let expirer = ActiveExpirer::start(Arc::clone(&store), fast_config()).unwrap();
            assert!(expirer.is_running());
            thread::sleep(Duration::from_millis(30));
            // Expirer is dropped here
        }

        store.set_with_ttl("key", "value", Duration::from_millis(10));
        thread::sleep(Duration::from_millis(60));

        // Nothing swept it, so it is still held...
        assert_eq!(store.stats().keys, 1);
        // ...but lazy expiry still hides and removes it
        assert_eq!(store.get("key").unwrap(), None);
        assert_eq!(store.stats().keys, 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let store = Arc::new(Store::new());
        let mut expirer = ActiveExpirer::start(Arc::clone(&store), fast_config()).unwrap();

        expirer.stop();
        assert!(!expirer.is_running());
        expirer.stop();
        assert!(!expirer.is_running());
    }

    #[test]
    fn test_stop_returns_promptly_with_long_interval() {
        let store = Arc::new(Store::new());
        let mut expirer =
            ActiveExpirer::start(store, ExpiryConfig::with_interval(Duration::from_secs(3600)))
                .unwrap();

        let started = std::time::Instant::now();
        expirer.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_independent_stores_do_not_interfere() {
        let swept = Arc::new(Store::new());
        let idle = Arc::new(Store::new());

        swept.set_with_ttl("k", "v", Duration::from_millis(10));
        idle.set_with_ttl("k", "v", Duration::from_millis(10));

        let _expirer = start_active_expirer(Arc::clone(&swept)).unwrap();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(swept.stats().keys, 0);
        assert_eq!(idle.stats().keys, 1);
    }
}
