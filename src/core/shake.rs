//! Shake gesture detection.
//!
//! A shake is rapid alternating horizontal pointer movement. The detector
//! keeps a short rolling history of pointer samples, classifies the movement
//! between the two newest retained samples as left or right, and counts
//! direction reversals. Once enough reversals accumulate a shake fires,
//! subject to a cooldown between fired shakes.
//!
//! # Algorithm
//!
//! For every accepted sample:
//!
//! 1. Append it to the history and evict samples older than the window.
//! 2. With fewer than two retained samples the gesture is broken: direction
//!    and reversal count are cleared.
//! 3. Movements smaller than the minimum are ignored entirely.
//! 4. The first qualifying movement sets a baseline direction. Every later
//!    change of direction is a reversal.
//! 5. When the reversal count reaches the threshold and the cooldown has
//!    elapsed, a shake fires and the gesture starts over. Inside the cooldown
//!    the count is left as it is.

use crate::core::history::{PointerSample, SampleHistory};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of reversals needed for a shake.
pub const DEFAULT_REVERSAL_THRESHOLD: u32 = 5;

/// Default time window for the rolling history, in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 500;

/// Default minimum horizontal movement that counts, in pixels.
pub const DEFAULT_MIN_MOVEMENT_PX: f64 = 50.0;

/// Default minimum time between fired shakes, in milliseconds.
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;

/// Immutable detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeDetectorConfig {
    /// Direction reversals required to fire (>= 1)
    pub reversal_threshold: u32,
    /// Rolling history window in milliseconds (> 0)
    pub window_ms: u64,
    /// Minimum horizontal movement in pixels (> 0)
    pub min_movement_px: f64,
    /// Minimum time between fired shakes in milliseconds
    pub cooldown_ms: u64,
}

impl Default for ShakeDetectorConfig {
    fn default() -> Self {
        Self {
            reversal_threshold: DEFAULT_REVERSAL_THRESHOLD,
            window_ms: DEFAULT_WINDOW_MS,
            min_movement_px: DEFAULT_MIN_MOVEMENT_PX,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl ShakeDetectorConfig {
    /// Check every configuration constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reversal_threshold < 1 {
            return Err(ConfigError::ReversalThreshold(self.reversal_threshold));
        }
        if self.window_ms == 0 {
            return Err(ConfigError::Window(self.window_ms));
        }
        if !self.min_movement_px.is_finite() || self.min_movement_px <= 0.0 {
            return Err(ConfigError::MinMovement(self.min_movement_px));
        }
        Ok(())
    }
}

/// Invalid detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ReversalThreshold(u32),
    Window(u64),
    MinMovement(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReversalThreshold(v) => {
                write!(f, "reversal threshold must be at least 1 (got {v})")
            }
            ConfigError::Window(v) => write!(f, "window must be greater than 0 ms (got {v})"),
            ConfigError::MinMovement(v) => {
                write!(f, "minimum movement must be a positive pixel count (got {v})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Classified horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

/// A fired shake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeEvent {
    /// Timestamp of the sample that completed the gesture
    pub timestamp_ms: f64,
    /// Reversals counted when the shake fired
    pub reversals: u32,
}

/// Stateful classifier turning pointer samples into shake events.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    config: ShakeDetectorConfig,
    history: SampleHistory,
    direction: Option<Direction>,
    reversals: u32,
    last_shake_ms: Option<f64>,
    last_timestamp_ms: Option<f64>,
    discarded_samples: u64,
    suppressed_shakes: u64,
}

impl ShakeDetector {
    /// Create a detector, rejecting invalid configuration.
    pub fn new(config: ShakeDetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            history: SampleHistory::new(config.window_ms),
            direction: None,
            reversals: 0,
            last_shake_ms: None,
            last_timestamp_ms: None,
            discarded_samples: 0,
            suppressed_shakes: 0,
        })
    }

    pub fn config(&self) -> &ShakeDetectorConfig {
        &self.config
    }

    /// Feed one pointer sample.
    ///
    /// Non-finite values and timestamps that do not move forward are
    /// discarded. Returns the shake event if this sample completed one.
    pub fn observe(&mut self, x: f64, timestamp_ms: f64) -> Option<ShakeEvent> {
        let sample = PointerSample::new(x, timestamp_ms);
        if !self.accepts(&sample) {
            self.discarded_samples += 1;
            return None;
        }

        self.last_timestamp_ms = Some(timestamp_ms);
        self.history.push(sample);

        let Some((previous, latest)) = self.history.last_pair() else {
            self.clear_gesture();
            return None;
        };

        let diff = latest.x - previous.x;
        if diff.abs() < self.config.min_movement_px {
            return None;
        }

        let current = if diff > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        };

        match self.direction {
            None => {
                self.direction = Some(current);
                return None;
            }
            Some(direction) if direction != current => {
                self.reversals = self.reversals.saturating_add(1);
                self.direction = Some(current);
            }
            Some(_) => {}
        }

        if self.reversals < self.config.reversal_threshold {
            return None;
        }

        if let Some(last) = self.last_shake_ms {
            if timestamp_ms - last <= self.config.cooldown_ms as f64 {
                // Counters stay as they are while cooling down.
                self.suppressed_shakes += 1;
                debug!(
                    reversals = self.reversals,
                    since_last_ms = timestamp_ms - last,
                    "shake suppressed by cooldown"
                );
                return None;
            }
        }

        let event = ShakeEvent {
            timestamp_ms,
            reversals: self.reversals,
        };
        debug!(
            reversals = event.reversals,
            timestamp_ms = event.timestamp_ms,
            "shake detected"
        );
        self.last_shake_ms = Some(timestamp_ms);
        self.clear_gesture();
        Some(event)
    }

    /// Feed one sample and call `on_shake` if it completed a shake.
    pub fn observe_with<F>(&mut self, x: f64, timestamp_ms: f64, on_shake: F)
    where
        F: FnOnce(ShakeEvent),
    {
        if let Some(event) = self.observe(x, timestamp_ms) {
            on_shake(event);
        }
    }

    /// Clear history, direction and reversal count without firing.
    ///
    /// The last shake time and the newest accepted timestamp are kept, so the
    /// cooldown and sample ordering still apply afterwards.
    pub fn reset(&mut self) {
        self.history.clear();
        self.clear_gesture();
    }

    /// Current classified direction, `None` when no baseline is set.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Reversals counted in the current unbroken gesture.
    pub fn reversals(&self) -> u32 {
        self.reversals
    }

    /// Number of samples currently retained.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Timestamp of the last fired shake.
    pub fn last_shake_ms(&self) -> Option<f64> {
        self.last_shake_ms
    }

    /// Samples rejected as malformed or out of order.
    pub fn discarded_samples(&self) -> u64 {
        self.discarded_samples
    }

    /// Shakes that reached the threshold inside the cooldown.
    pub fn suppressed_shakes(&self) -> u64 {
        self.suppressed_shakes
    }

    fn accepts(&self, sample: &PointerSample) -> bool {
        if !sample.is_finite() {
            return false;
        }
        match self.last_timestamp_ms {
            Some(last) => sample.timestamp_ms > last,
            None => true,
        }
    }

    fn clear_gesture(&mut self) {
        self.direction = None;
        self.reversals = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ShakeDetector {
        ShakeDetector::new(ShakeDetectorConfig::default()).unwrap()
    }

    /// Feed alternating positions starting at `start_ms`, `step_ms` apart.
    fn feed(detector: &mut ShakeDetector, xs: &[f64], start_ms: f64, step_ms: f64) -> usize {
        xs.iter()
            .enumerate()
            .filter_map(|(i, &x)| detector.observe(x, start_ms + i as f64 * step_ms))
            .count()
    }

    #[test]
    fn test_config_validation() {
        assert!(ShakeDetectorConfig::default().validate().is_ok());

        let config = ShakeDetectorConfig {
            reversal_threshold: 0,
            ..Default::default()
        };
        assert_eq!(
            ShakeDetector::new(config).unwrap_err(),
            ConfigError::ReversalThreshold(0)
        );

        let config = ShakeDetectorConfig {
            window_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Window(0)));

        let config = ShakeDetectorConfig {
            min_movement_px: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MinMovement(_))));

        let config = ShakeDetectorConfig {
            min_movement_px: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ShakeDetectorConfig {
            cooldown_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_first_movement_sets_baseline() {
        let mut d = detector();
        assert!(d.observe(0.0, 0.0).is_none());
        assert_eq!(d.direction(), None);

        assert!(d.observe(100.0, 40.0).is_none());
        assert_eq!(d.direction(), Some(Direction::Right));
        assert_eq!(d.reversals(), 0);
    }

    #[test]
    fn test_same_direction_is_not_reversal() {
        let mut d = detector();
        feed(&mut d, &[0.0, 100.0, 200.0, 300.0], 0.0, 40.0);
        assert_eq!(d.direction(), Some(Direction::Right));
        assert_eq!(d.reversals(), 0);
    }

    #[test]
    fn test_fires_at_threshold_and_resets() {
        let mut d = detector();
        let xs = [0.0, 100.0, 0.0, 100.0, 0.0, 100.0];
        assert_eq!(feed(&mut d, &xs, 0.0, 40.0), 0);
        assert_eq!(d.reversals(), 4);

        let event = d.observe(0.0, 240.0).expect("fifth reversal fires");
        assert_eq!(event.reversals, 5);
        assert_eq!(event.timestamp_ms, 240.0);
        assert_eq!(d.reversals(), 0);
        assert_eq!(d.direction(), None);
        assert_eq!(d.last_shake_ms(), Some(240.0));
    }

    #[test]
    fn test_movement_equal_to_minimum_counts() {
        let mut d = detector();
        feed(&mut d, &[0.0, 50.0, 0.0], 0.0, 10.0);
        assert_eq!(d.reversals(), 1);
    }

    #[test]
    fn test_small_movements_ignored() {
        let mut d = detector();
        let xs = [0.0, 49.0, 0.0, 49.0, 0.0, 49.0, 0.0, 49.0, 0.0, 49.0, 0.0];
        assert_eq!(feed(&mut d, &xs, 0.0, 20.0), 0);
        assert_eq!(d.direction(), None);
        assert_eq!(d.reversals(), 0);
    }

    #[test]
    fn test_out_of_order_and_non_finite_samples_discarded() {
        let mut d = detector();
        d.observe(0.0, 100.0);
        d.observe(100.0, 140.0);
        d.observe(0.0, 140.0);
        d.observe(0.0, 120.0);
        d.observe(f64::NAN, 200.0);
        d.observe(0.0, f64::INFINITY);

        assert_eq!(d.discarded_samples(), 4);
        assert_eq!(d.history_len(), 2);
        assert_eq!(d.reversals(), 0);
    }

    #[test]
    fn test_gap_longer_than_window_breaks_gesture() {
        let mut d = detector();
        feed(&mut d, &[0.0, 100.0, 0.0, 100.0], 0.0, 40.0);
        assert_eq!(d.reversals(), 2);

        d.observe(0.0, 1000.0);
        assert_eq!(d.history_len(), 1);
        assert_eq!(d.reversals(), 0);
        assert_eq!(d.direction(), None);
    }

    #[test]
    fn test_cooldown_keeps_counters() {
        let mut d = detector();
        let xs = [0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0];
        assert_eq!(feed(&mut d, &xs, 0.0, 40.0), 1);

        // Seven more reversals inside the cooldown.
        let xs = [100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0];
        assert_eq!(feed(&mut d, &xs, 280.0, 40.0), 0);
        assert!(d.reversals() >= 5);
        assert!(d.suppressed_shakes() > 0);
    }

    #[test]
    fn test_suppressed_count_fires_after_cooldown() {
        let config = ShakeDetectorConfig {
            reversal_threshold: 2,
            window_ms: 5000,
            min_movement_px: 10.0,
            cooldown_ms: 300,
        };
        let mut d = ShakeDetector::new(config).unwrap();
        assert_eq!(feed(&mut d, &[0.0, 20.0, 0.0, 20.0], 0.0, 10.0), 1);

        // Threshold reached again at t=60 but suppressed.
        assert_eq!(feed(&mut d, &[0.0, 20.0, 0.0, 20.0], 40.0, 10.0), 0);
        assert_eq!(d.reversals(), 3);

        // Same-direction movement after the cooldown fires on the kept count.
        let event = d.observe(40.0, 400.0).expect("fires once cooldown elapsed");
        assert_eq!(event.reversals, 3);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut d = detector();
        feed(&mut d, &[0.0, 100.0, 0.0, 100.0], 0.0, 40.0);
        d.reset();

        assert_eq!(d.history_len(), 0);
        assert_eq!(d.reversals(), 0);
        assert_eq!(d.direction(), None);
        assert_eq!(d.last_shake_ms(), None);
    }

    #[test]
    fn test_reset_keeps_sample_ordering() {
        let mut d = detector();
        d.observe(0.0, 1000.0);
        d.observe(100.0, 1040.0);
        d.reset();

        assert!(d.observe(0.0, 10.0).is_none());
        assert!(d.observe(0.0, 1040.0).is_none());
        assert_eq!(d.discarded_samples(), 2);
        assert_eq!(d.history_len(), 0);

        d.observe(0.0, 1100.0);
        assert_eq!(d.history_len(), 1);
    }

    #[test]
    fn test_reversal_count_saturates_during_cooldown() {
        let config = ShakeDetectorConfig {
            reversal_threshold: 1,
            cooldown_ms: u64::MAX,
            ..ShakeDetectorConfig::default()
        };
        let mut d = ShakeDetector::new(config).unwrap();
        assert_eq!(feed(&mut d, &[0.0, 100.0, 0.0], 0.0, 40.0), 1);

        // Re-establish a direction, then pin the count at its ceiling.
        feed(&mut d, &[100.0, 0.0], 120.0, 40.0);
        d.reversals = u32::MAX;
        assert_eq!(feed(&mut d, &[100.0, 0.0, 100.0], 200.0, 40.0), 0);
        assert_eq!(d.reversals(), u32::MAX);
        assert!(d.suppressed_shakes() > 0);
    }

    #[test]
    fn test_observe_with_callback() {
        let mut d = detector();
        let mut fired = Vec::new();
        let xs = [0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0];
        for (i, &x) in xs.iter().enumerate() {
            d.observe_with(x, i as f64 * 40.0, |event| fired.push(event));
        }
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].timestamp_ms, 240.0);
    }
}
