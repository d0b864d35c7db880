//! Pointer event types delivered by collectors.
//!
//! Only the horizontal position and a monotonic timestamp are carried; that is
//! all the shake detector needs.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A pointer event from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer moved to horizontal position `x` (pixels)
    Move { x: f64, timestamp_ms: f64 },
    /// Primary button pressed; unlocks a locked screen
    Click { timestamp_ms: f64 },
}

impl PointerEvent {
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            PointerEvent::Move { timestamp_ms, .. } => *timestamp_ms,
            PointerEvent::Click { timestamp_ms } => *timestamp_ms,
        }
    }
}

/// Monotonic millisecond clock anchored at creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock started.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    pub fn movement(&self, x: f64) -> PointerEvent {
        PointerEvent::Move {
            x,
            timestamp_ms: self.now_ms(),
        }
    }

    pub fn click(&self) -> PointerEvent {
        PointerEvent::Click {
            timestamp_ms: self.now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_json_shape() {
        let event = PointerEvent::Move {
            x: 12.5,
            timestamp_ms: 40.0,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["x"], 12.5);

        let click: PointerEvent =
            serde_json::from_str(r#"{"type":"click","timestamp_ms":7}"#).unwrap();
        assert_eq!(click.timestamp_ms(), 7.0);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::start();
        let first = clock.movement(0.0).timestamp_ms();
        let second = clock.click().timestamp_ms();
        assert!(second >= first);
        assert!(first >= 0.0);
    }
}
