//! Two-state lock machine.
//!
//! The machine starts `Unlocked`. Locking and unlocking are idempotent: each
//! call reports whether a transition actually happened so callers can decide
//! whether to notify collaborators.

use serde::{Deserialize, Serialize};

/// Lock state exposed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

impl LockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Unlocked => "unlocked",
            LockState::Locked => "locked",
        }
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LockStateMachine {
    state: LockState,
}

impl LockStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Locked`. Returns `false` if already locked.
    pub fn lock(&mut self) -> bool {
        match self.state {
            LockState::Unlocked => {
                self.state = LockState::Locked;
                true
            }
            LockState::Locked => false,
        }
    }

    /// Enter `Unlocked`. Returns `false` if already unlocked.
    pub fn unlock(&mut self) -> bool {
        match self.state {
            LockState::Locked => {
                self.state = LockState::Unlocked;
                true
            }
            LockState::Unlocked => false,
        }
    }

    pub fn current_state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unlocked() {
        let machine = LockStateMachine::new();
        assert_eq!(machine.current_state(), LockState::Unlocked);
        assert!(!machine.is_locked());
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut machine = LockStateMachine::new();
        assert!(machine.lock());
        assert!(!machine.lock());
        assert_eq!(machine.current_state(), LockState::Locked);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut machine = LockStateMachine::new();
        assert!(!machine.unlock());
        assert_eq!(machine.current_state(), LockState::Unlocked);

        machine.lock();
        assert!(machine.unlock());
        assert!(!machine.unlock());
        assert_eq!(machine.current_state(), LockState::Unlocked);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&LockState::Locked).unwrap();
        assert_eq!(json, "\"locked\"");
        assert_eq!(LockState::Unlocked.to_string(), "unlocked");
    }
}
