//! Core functionality for shakelock.
//!
//! This module contains:
//! - The rolling pointer history
//! - Shake gesture detection
//! - The two-state lock machine and the controller that connects them

pub mod controller;
pub mod history;
pub mod lock;
pub mod shake;

// Re-export commonly used types
pub use controller::{LockController, LockEvent, LockEventKind, LockTrigger, MAX_RECENT_EVENTS};
pub use history::{PointerSample, SampleHistory};
pub use lock::{LockState, LockStateMachine};
pub use shake::{ConfigError, Direction, ShakeDetector, ShakeDetectorConfig, ShakeEvent};
