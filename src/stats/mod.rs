//! Activity statistics for shakelock.
//!
//! Tracks how much pointer input was processed and how often the lock
//! changed state, without retaining any positions.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_from_store, ActivityLog, ActivityStats,
    SharedActivityLog, ACTIVITY_KEY,
};
