//! Activity log for gesture tracking.
//!
//! Counts what the lock controller has seen without keeping any pointer
//! positions. Counters are cumulative across runs when restored from and
//! saved to a key-value store.

use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Store key the counters are persisted under.
pub const ACTIVITY_KEY: &str = "activity";

/// Gesture and lock counters for the current session.
#[derive(Debug)]
pub struct ActivityLog {
    /// Pointer samples received from the host
    samples_observed: AtomicU64,
    /// Samples rejected as malformed or out of order
    samples_discarded: AtomicU64,
    /// Shakes fired by the detector
    shakes_detected: AtomicU64,
    /// Shakes held back by the cooldown
    shakes_suppressed: AtomicU64,
    /// Transitions into the locked state
    locks: AtomicU64,
    /// Transitions out of the locked state
    unlocks: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            samples_observed: AtomicU64::new(0),
            samples_discarded: AtomicU64::new(0),
            shakes_detected: AtomicU64::new(0),
            shakes_suppressed: AtomicU64::new(0),
            locks: AtomicU64::new(0),
            unlocks: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    /// Create a log seeded with counters previously saved to `store`.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let log = Self::new();
        if let Err(e) = log.load(store) {
            tracing::warn!("Could not load previous activity stats: {e}");
        }
        log
    }

    pub fn record_sample(&self) {
        self.samples_observed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded_sample(&self) {
        self.samples_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shake(&self) {
        self.shakes_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shake_suppressed(&self) {
        self.shakes_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lock(&self) {
        self.locks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unlock(&self) {
        self.unlocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ActivityStats {
        ActivityStats {
            samples_observed: self.samples_observed.load(Ordering::Relaxed),
            samples_discarded: self.samples_discarded.load(Ordering::Relaxed),
            shakes_detected: self.shakes_detected.load(Ordering::Relaxed),
            shakes_suppressed: self.shakes_suppressed.load(Ordering::Relaxed),
            locks: self.locks.load(Ordering::Relaxed),
            unlocks: self.unlocks.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Pointer samples observed: {}\n\
             - Samples discarded: {}\n\
             - Shakes detected: {}\n\
             - Shakes suppressed by cooldown: {}\n\
             - Locks: {}\n\
             - Unlocks: {}\n\
             - Session duration: {} seconds",
            stats.samples_observed,
            stats.samples_discarded,
            stats.shakes_detected,
            stats.shakes_suppressed,
            stats.locks,
            stats.unlocks,
            stats.session_duration_secs
        )
    }

    /// Persist the counters to `store`.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), std::io::Error> {
        let stats = self.stats();
        let persisted = PersistedStats {
            samples_observed: stats.samples_observed,
            samples_discarded: stats.samples_discarded,
            shakes_detected: stats.shakes_detected,
            shakes_suppressed: stats.shakes_suppressed,
            locks: stats.locks,
            unlocks: stats.unlocks,
            last_updated: Utc::now(),
        };

        let json = serde_json::to_string(&persisted).map_err(std::io::Error::other)?;
        store.set(ACTIVITY_KEY, json)
    }

    fn load(&self, store: &dyn KeyValueStore) -> Result<(), std::io::Error> {
        let Some(content) = store.get(ACTIVITY_KEY) else {
            return Ok(());
        };
        let persisted: PersistedStats =
            serde_json::from_str(&content).map_err(std::io::Error::other)?;

        self.samples_observed
            .store(persisted.samples_observed, Ordering::Relaxed);
        self.samples_discarded
            .store(persisted.samples_discarded, Ordering::Relaxed);
        self.shakes_detected
            .store(persisted.shakes_detected, Ordering::Relaxed);
        self.shakes_suppressed
            .store(persisted.shakes_suppressed, Ordering::Relaxed);
        self.locks.store(persisted.locks, Ordering::Relaxed);
        self.unlocks.store(persisted.unlocks, Ordering::Relaxed);
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_observed.store(0, Ordering::Relaxed);
        self.samples_discarded.store(0, Ordering::Relaxed);
        self.shakes_detected.store(0, Ordering::Relaxed);
        self.shakes_suppressed.store(0, Ordering::Relaxed);
        self.locks.store(0, Ordering::Relaxed);
        self.unlocks.store(0, Ordering::Relaxed);
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of activity statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStats {
    pub samples_observed: u64,
    pub samples_discarded: u64,
    pub shakes_detected: u64,
    pub shakes_suppressed: u64,
    pub locks: u64,
    pub unlocks: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    samples_observed: u64,
    samples_discarded: u64,
    shakes_detected: u64,
    shakes_suppressed: u64,
    locks: u64,
    unlocks: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared activity log.
pub type SharedActivityLog = Arc<ActivityLog>;

pub fn create_shared_log() -> SharedActivityLog {
    Arc::new(ActivityLog::new())
}

/// Create a shared log seeded from `store`.
pub fn create_shared_log_from_store(store: &dyn KeyValueStore) -> SharedActivityLog {
    Arc::new(ActivityLog::restore(store))
}
