//! One-shot action triggers with hold time and cooldown.
//!
//! Each debounced action (pinch select, fist reset) owns a small state
//! machine:
//!
//! ```text
//! Idle ──engage──▶ ArmedOnHold ──held ≥ hold_ms──▶ Fired
//!   ▲                   │                            │
//!   └──────release──────┘          release ──▶ Cooldown ──elapsed──▶ Idle
//! ```
//!
//! A trigger fires at most once per gesture instance and never twice
//! within `cooldown_ms`.

/// Current phase of a trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerPhase {
    /// Gesture not engaged.
    Idle,
    /// Gesture engaged, waiting for hold time or cooldown.
    ArmedOnHold,
    /// Fired for the current gesture instance.
    Fired,
    /// Released after firing; cooldown still running.
    Cooldown,
}

impl TriggerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ArmedOnHold => "armed",
            Self::Fired => "fired",
            Self::Cooldown => "cooldown",
        }
    }
}

/// Hold-then-fire trigger with a refractory cooldown.
#[derive(Debug, Clone)]
pub struct ActionTrigger {
    /// Continuous hold required before firing (ms).
    pub hold_ms: f64,
    /// Minimum time between fires (ms).
    pub cooldown_ms: f64,
    phase: TriggerPhase,
    last_fired_ms: Option<f64>,
}

impl ActionTrigger {
    pub fn new(hold_ms: f64, cooldown_ms: f64) -> Self {
        Self {
            hold_ms,
            cooldown_ms,
            phase: TriggerPhase::Idle,
            last_fired_ms: None,
        }
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    fn cooling(&self, now_ms: f64) -> bool {
        self.last_fired_ms
            .map_or(false, |t| now_ms - t < self.cooldown_ms)
    }

    /// Advance while the gesture is engaged.
    ///
    /// `held_ms` is how long the gesture has been held continuously.
    /// Returns true on the frame the action should fire.
    pub fn engage(&mut self, held_ms: f64, now_ms: f64) -> bool {
        match self.phase {
            TriggerPhase::Fired => false,
            _ if held_ms < self.hold_ms || self.cooling(now_ms) => {
                self.phase = TriggerPhase::ArmedOnHold;
                false
            }
            _ => {
                self.phase = TriggerPhase::Fired;
                self.last_fired_ms = Some(now_ms);
                true
            }
        }
    }

    /// The gesture ended; re-arm for the next instance.
    pub fn release(&mut self, now_ms: f64) {
        self.phase = if self.cooling(now_ms) {
            TriggerPhase::Cooldown
        } else {
            TriggerPhase::Idle
        };
    }

    /// Let an expired cooldown fall back to idle.
    pub fn tick(&mut self, now_ms: f64) {
        if self.phase == TriggerPhase::Cooldown && !self.cooling(now_ms) {
            self.phase = TriggerPhase::Idle;
        }
    }

    /// Forget phase and cooldown.
    pub fn reset(&mut self) {
        self.phase = TriggerPhase::Idle;
        self.last_fired_ms = None;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_threshold() {
        let mut t = ActionTrigger::new(800.0, 1500.0);
        assert!(!t.engage(0.0, 0.0));
        assert_eq!(t.phase(), TriggerPhase::ArmedOnHold);
        assert!(!t.engage(799.0, 799.0));
        assert!(t.engage(801.0, 801.0));
        assert_eq!(t.phase(), TriggerPhase::Fired);
    }

    #[test]
    fn test_fires_once_per_instance() {
        let mut t = ActionTrigger::new(0.0, 700.0);
        assert!(t.engage(0.0, 0.0));
        for i in 1..40 {
            let now = i as f64 * 50.0;
            assert!(!t.engage(now, now), "re-fired at {}", now);
        }
    }

    #[test]
    fn test_cooldown_after_release() {
        let mut t = ActionTrigger::new(0.0, 700.0);
        assert!(t.engage(0.0, 0.0));
        t.release(100.0);
        assert_eq!(t.phase(), TriggerPhase::Cooldown);
        assert!(!t.engage(0.0, 200.0));
        assert_eq!(t.phase(), TriggerPhase::ArmedOnHold);
        // Still held when the cooldown runs out: fires then.
        assert!(t.engage(500.0, 700.0));
    }

    #[test]
    fn test_release_after_cooldown_goes_idle() {
        let mut t = ActionTrigger::new(0.0, 700.0);
        t.engage(0.0, 0.0);
        t.release(900.0);
        assert_eq!(t.phase(), TriggerPhase::Idle);
    }

    #[test]
    fn test_tick_expires_cooldown() {
        let mut t = ActionTrigger::new(0.0, 700.0);
        t.engage(0.0, 0.0);
        t.release(10.0);
        t.tick(500.0);
        assert_eq!(t.phase(), TriggerPhase::Cooldown);
        t.tick(700.0);
        assert_eq!(t.phase(), TriggerPhase::Idle);
    }

    #[test]
    fn test_release_while_armed() {
        let mut t = ActionTrigger::new(800.0, 1500.0);
        t.engage(300.0, 300.0);
        t.release(300.0);
        assert_eq!(t.phase(), TriggerPhase::Idle);
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut t = ActionTrigger::new(0.0, 700.0);
        t.engage(0.0, 0.0);
        t.reset();
        assert!(t.engage(0.0, 10.0));
    }
}
