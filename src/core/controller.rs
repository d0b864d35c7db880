//! Lock controller wiring the shake detector to the lock state machine.
//!
//! The controller is the single owner of both components. Hosts feed it
//! pointer moves and unlock input; it returns the resulting lock events and
//! publishes them to subscribers (overlay, audio cue, scroll suppression).
//! It is not internally synchronized: multi-threaded hosts serialize access.

use crate::core::lock::{LockState, LockStateMachine};
use crate::core::shake::{ConfigError, ShakeDetector, ShakeDetectorConfig, ShakeEvent};
use crate::stats::SharedActivityLog;
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;
use uuid::Uuid;

/// What happened to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockEventKind {
    Locked,
    Unlocked,
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTrigger {
    /// Shake gesture detected from pointer input
    Shake,
    /// Explicit lock request from the host
    Manual,
    /// Click or tap on the lock overlay
    UnlockInput,
}

/// A lock state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockEvent {
    /// Unique event identifier
    pub id: Uuid,
    pub kind: LockEventKind,
    pub trigger: LockTrigger,
    /// Wall-clock time of the transition
    pub at: DateTime<Utc>,
    /// The shake that caused a lock, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shake: Option<ShakeEvent>,
}

impl LockEvent {
    fn new(kind: LockEventKind, trigger: LockTrigger, shake: Option<ShakeEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            trigger,
            at: Utc::now(),
            shake,
        }
    }

    /// State the lock is in after this event.
    pub fn state(&self) -> LockState {
        match self.kind {
            LockEventKind::Locked => LockState::Locked,
            LockEventKind::Unlocked => LockState::Unlocked,
        }
    }
}

/// Transitions kept in the recent-events ring.
pub const MAX_RECENT_EVENTS: usize = 64;

pub struct LockController {
    detector: ShakeDetector,
    machine: LockStateMachine,
    shake_enabled: bool,
    subscribers: Vec<Sender<LockEvent>>,
    recent: VecDeque<LockEvent>,
    activity: Option<SharedActivityLog>,
}

impl LockController {
    /// Create a controller in the `Unlocked` state.
    pub fn new(config: ShakeDetectorConfig, shake_enabled: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            detector: ShakeDetector::new(config)?,
            machine: LockStateMachine::new(),
            shake_enabled,
            subscribers: Vec::new(),
            recent: VecDeque::with_capacity(MAX_RECENT_EVENTS),
            activity: None,
        })
    }

    /// Attach an activity log that counts samples, shakes and transitions.
    pub fn with_activity_log(mut self, log: SharedActivityLog) -> Self {
        self.activity = Some(log);
        self
    }

    /// Handle a pointer move from the host.
    ///
    /// Input is ignored while locked or while shake detection is disabled.
    pub fn pointer_moved(&mut self, x: f64, timestamp_ms: f64) -> Option<LockEvent> {
        if let Some(log) = &self.activity {
            log.record_sample();
        }

        if !self.shake_enabled || self.machine.is_locked() {
            return None;
        }

        let discarded_before = self.detector.discarded_samples();
        let suppressed_before = self.detector.suppressed_shakes();

        let shake = self.detector.observe(x, timestamp_ms);

        if let Some(log) = &self.activity {
            if self.detector.discarded_samples() > discarded_before {
                log.record_discarded_sample();
            }
            if self.detector.suppressed_shakes() > suppressed_before {
                log.record_shake_suppressed();
            }
            if shake.is_some() {
                log.record_shake();
            }
        }

        let shake = shake?;
        self.enter_locked(LockTrigger::Shake, Some(shake))
    }

    /// Lock without a gesture.
    pub fn lock_now(&mut self) -> Option<LockEvent> {
        self.enter_locked(LockTrigger::Manual, None)
    }

    /// Handle a click or tap on the lock overlay.
    pub fn unlock_input(&mut self) -> Option<LockEvent> {
        if !self.machine.unlock() {
            return None;
        }

        let event = LockEvent::new(LockEventKind::Unlocked, LockTrigger::UnlockInput, None);
        info!(id = %event.id, "unlocked");
        if let Some(log) = &self.activity {
            log.record_unlock();
        }
        self.publish(&event);
        Some(event)
    }

    /// Enable or disable shake detection. Disabling disarms the detector.
    pub fn set_shake_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.detector.reset();
        }
        self.shake_enabled = enabled;
    }

    pub fn shake_enabled(&self) -> bool {
        self.shake_enabled
    }

    pub fn current_state(&self) -> LockState {
        self.machine.current_state()
    }

    pub fn detector(&self) -> &ShakeDetector {
        &self.detector
    }

    /// The most recent transitions, oldest first, capped at
    /// [`MAX_RECENT_EVENTS`].
    pub fn recent_events(&self) -> &VecDeque<LockEvent> {
        &self.recent
    }

    /// Receive every future lock event.
    pub fn subscribe(&mut self) -> Receiver<LockEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn enter_locked(&mut self, trigger: LockTrigger, shake: Option<ShakeEvent>) -> Option<LockEvent> {
        if !self.machine.lock() {
            return None;
        }

        // Disarm so pointer input from the locked session cannot carry over.
        self.detector.reset();

        let event = LockEvent::new(LockEventKind::Locked, trigger, shake);
        info!(id = %event.id, trigger = ?trigger, "locked");
        if let Some(log) = &self.activity {
            log.record_lock();
        }
        self.publish(&event);
        Some(event)
    }

    fn publish(&mut self, event: &LockEvent) {
        if self.recent.len() == MAX_RECENT_EVENTS {
            self.recent.pop_front();
        }
        self.recent.push_back(event.clone());
        // Dropped receivers are pruned.
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ActivityLog;
    use std::sync::Arc;

    const SHAKE: [f64; 10] = [0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0];

    fn controller() -> LockController {
        LockController::new(ShakeDetectorConfig::default(), true).unwrap()
    }

    fn shake(controller: &mut LockController, start_ms: f64) -> Vec<LockEvent> {
        SHAKE
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| controller.pointer_moved(x, start_ms + i as f64 * 40.0))
            .collect()
    }

    #[test]
    fn test_shake_locks_once() {
        let mut c = controller();
        let events = shake(&mut c, 0.0);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, LockEventKind::Locked);
        assert_eq!(events[0].trigger, LockTrigger::Shake);
        assert_eq!(events[0].shake.map(|s| s.timestamp_ms), Some(240.0));
        assert_eq!(c.current_state(), LockState::Locked);
    }

    #[test]
    fn test_pointer_input_ignored_while_locked() {
        let mut c = controller();
        c.lock_now();

        assert!(shake(&mut c, 0.0).is_empty());
        assert_eq!(c.detector().history_len(), 0);
        assert_eq!(c.recent_events().len(), 1);
    }

    #[test]
    fn test_unlock_input() {
        let mut c = controller();
        assert!(c.unlock_input().is_none());

        shake(&mut c, 0.0);
        let event = c.unlock_input().expect("locked controller unlocks");
        assert_eq!(event.kind, LockEventKind::Unlocked);
        assert_eq!(event.state(), LockState::Unlocked);
        assert_eq!(c.current_state(), LockState::Unlocked);
        assert!(c.unlock_input().is_none());
    }

    #[test]
    fn test_disabled_shake_does_not_lock() {
        let mut c = LockController::new(ShakeDetectorConfig::default(), false).unwrap();
        assert!(shake(&mut c, 0.0).is_empty());
        assert_eq!(c.current_state(), LockState::Unlocked);

        // Manual lock still works.
        assert!(c.lock_now().is_some());
        assert!(c.lock_now().is_none());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let mut c = controller();
        let rx = c.subscribe();
        let dropped = c.subscribe();
        drop(dropped);

        shake(&mut c, 0.0);
        c.unlock_input();

        let received: Vec<LockEventKind> = rx.try_iter().map(|e| e.kind).collect();
        assert_eq!(
            received,
            vec![LockEventKind::Locked, LockEventKind::Unlocked]
        );
        assert_eq!(c.subscribers.len(), 1);
    }

    #[test]
    fn test_activity_log_counts() {
        let log = Arc::new(ActivityLog::new());
        let mut c = controller().with_activity_log(log.clone());

        shake(&mut c, 0.0);
        c.pointer_moved(f64::NAN, 1000.0);
        c.unlock_input();
        c.pointer_moved(f64::NAN, 1000.0);

        let stats = log.stats();
        assert_eq!(stats.samples_observed, 12);
        assert_eq!(stats.samples_discarded, 1);
        assert_eq!(stats.shakes_detected, 1);
        assert_eq!(stats.locks, 1);
        assert_eq!(stats.unlocks, 1);
    }

    #[test]
    fn test_recent_events_bounded() {
        let mut c = controller();
        for _ in 0..10_000 {
            c.lock_now();
            c.unlock_input();
        }

        let recent = c.recent_events();
        assert_eq!(recent.len(), MAX_RECENT_EVENTS);
        assert_eq!(recent.back().map(|e| e.kind), Some(LockEventKind::Unlocked));
        assert_eq!(recent.front().map(|e| e.trigger), Some(LockTrigger::Manual));
    }

    #[test]
    fn test_lock_event_serialization() {
        let mut c = controller();
        let event = c.lock_now().unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "locked");
        assert_eq!(json["trigger"], "manual");
        assert!(json.get("shake").is_none());
    }
}
