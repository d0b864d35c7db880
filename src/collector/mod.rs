//! Pointer event collection for shakelock.
//!
//! This module provides platform-specific implementations for capturing
//! pointer movement and clicks, plus a reader for recorded traces.

pub mod replay;
pub mod types;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(not(target_os = "macos"))]
pub mod noop;

// Re-export commonly used types
pub use replay::{read_events, ReplayError};
pub use types::{MonotonicClock, PointerEvent};

#[cfg(target_os = "macos")]
pub use macos::{check_permission, is_supported, CollectorConfig, CollectorError, MacOSCollector};

/// Platform-agnostic collector type alias
#[cfg(target_os = "macos")]
pub type Collector = MacOSCollector;

#[cfg(not(target_os = "macos"))]
pub use noop::{check_permission, is_supported, CollectorConfig, CollectorError, NoopCollector};

/// Platform-agnostic collector type alias
#[cfg(not(target_os = "macos"))]
pub type Collector = NoopCollector;
