//! shakelock - shake-to-lock gesture detection for pointer-driven hosts.
//!
//! Shaking the pointer rapidly left and right locks the screen; a click or
//! tap on the lock overlay unlocks it. This library provides the gesture
//! detector, the lock state machine, and the pieces needed to host them:
//! pointer collectors, a small persistence shim, activity counters and an
//! optional HTTP host for browser pages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          shakelock                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │  Collector  │──▶│   Shake     │──▶│    Lock     │──▶ events│
//! │  │ / HTTP host │   │  Detector   │   │   Machine   │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │                           │                 │                 │
//! │                           ▼                 ▼                 │
//! │                    ┌─────────────────────────────┐            │
//! │                    │   Activity Log  →  Store    │            │
//! │                    └─────────────────────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use shakelock::core::{LockController, LockState, ShakeDetectorConfig};
//!
//! let mut controller = LockController::new(ShakeDetectorConfig::default(), true).unwrap();
//!
//! for (i, x) in [0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0].into_iter().enumerate() {
//!     controller.pointer_moved(x, i as f64 * 40.0);
//! }
//! assert_eq!(controller.current_state(), LockState::Locked);
//!
//! controller.unlock_input();
//! assert_eq!(controller.current_state(), LockState::Unlocked);
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod stats;
pub mod store;

#[cfg(feature = "quote")]
pub mod quote;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorConfig, CollectorError, PointerEvent};
pub use config::{Config, SettingsError};
pub use crate::core::{
    ConfigError, LockController, LockEvent, LockEventKind, LockState, LockStateMachine,
    LockTrigger, ShakeDetector, ShakeDetectorConfig, ShakeEvent,
};
pub use stats::{ActivityLog, ActivityStats, SharedActivityLog};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

#[cfg(feature = "quote")]
pub use quote::{BlockingHitokotoClient, HitokotoClient, Quote, QuoteError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Store key for the cumulative lock counter.
pub const LOCK_COUNT_KEY: &str = "lock_count";
