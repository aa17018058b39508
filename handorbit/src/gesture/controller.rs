//! Gesture-to-action mapping with momentum.
//!
//! Consumes the `GestureSample` stream and issues bounded deltas against a
//! `TargetModel`: twist rotation with proportional, unclamped velocity and
//! momentum decay; palm tilt; debounced pinch selection and fist reset;
//! two-hand expansion; swipe selection; idle fallback.

use tracing::{debug, info};

use super::recognizer::{GestureLabel, GestureSample};
use super::trigger::ActionTrigger;
use crate::scene::TargetModel;

/// Velocities below this snap to zero after decay.
const MOMENTUM_EPSILON: f32 = 1e-4;

// ── Config ─────────────────────────────────────────────────

/// Tuning for the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Model radians per radian of filtered hand roll.
    pub twist_sensitivity: f32,
    /// Fraction of the gap to target velocity closed per frame.
    pub rotation_acceleration: f32,
    /// Model radians of tilt per unit of vertical palm motion.
    pub tilt_sensitivity: f32,
    /// EMA factor for tilt input.
    pub tilt_smoothing: f32,
    /// Largest tilt change per frame (radians).
    pub tilt_step_limit: f32,
    /// Total tilt bound (radians).
    pub tilt_limit: f32,
    /// Per-frame multiplier applied to velocity when not rotating.
    pub momentum_decay: f32,
    /// Time without hands before idle mode is requested (ms).
    pub idle_timeout_ms: f64,
    pub pinch_hold_ms: f64,
    pub pinch_cooldown_ms: f64,
    pub fist_hold_ms: f64,
    pub fist_cooldown_ms: f64,
    /// EMA factor for the signed two-hand delta.
    pub expansion_smoothing: f32,
    /// Expansion per unit of smoothed two-hand delta.
    pub expansion_gain: f32,
    /// Selections below this expansion nudge the model open.
    pub auto_expand_below: f32,
    /// Expansion to open to on selection.
    pub auto_expand_to: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            twist_sensitivity: 2.0,
            rotation_acceleration: 0.45,
            tilt_sensitivity: 1.0,
            tilt_smoothing: 0.18,
            tilt_step_limit: 0.01,
            tilt_limit: 0.8,
            momentum_decay: 0.92,
            idle_timeout_ms: 2500.0,
            pinch_hold_ms: 0.0,
            pinch_cooldown_ms: 700.0,
            fist_hold_ms: 800.0,
            fist_cooldown_ms: 1500.0,
            expansion_smoothing: 0.3,
            expansion_gain: 3.0,
            auto_expand_below: 0.15,
            auto_expand_to: 0.2,
        }
    }
}

// ── Actions ────────────────────────────────────────────────

/// What the controller did this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// The stable gesture label changed.
    GestureChanged {
        from: GestureLabel,
        to: GestureLabel,
    },
    /// Rotation applied (radians).
    Rotate { delta_y: f32, delta_x: f32 },
    /// Selection cursor moved.
    Select { direction: i32, region: usize },
    /// View reset (fist hold).
    Reset,
    /// Expansion changed by `delta`; `percent` is the new amount.
    Expand { delta: f32, percent: u32 },
    /// Idle mode requested or released.
    Idle(bool),
}

impl ControlAction {
    pub fn to_sexp(&self) -> String {
        match self {
            Self::GestureChanged { from, to } => {
                format!("(:gesture-changed :from :{} :to :{})", from.as_str(), to.as_str())
            }
            Self::Rotate { delta_y, delta_x } => {
                format!("(:rotate :dy {:.4} :dx {:.4})", delta_y, delta_x)
            }
            Self::Select { direction, region } => {
                format!("(:select :direction {} :region {})", direction, region)
            }
            Self::Reset => "(:reset)".to_string(),
            Self::Expand { delta, percent } => {
                format!("(:expand :delta {:.4} :percent {})", delta, percent)
            }
            Self::Idle(on) => format!("(:idle {})", if *on { "t" } else { "nil" }),
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Mutable controller state; persists for the session.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub current: GestureLabel,
    pub previous: GestureLabel,
    /// When `current` began (ms).
    pub entered_at_ms: f64,
    pub pinch: ActionTrigger,
    pub fist: ActionTrigger,
    /// Y rotation per frame (radians).
    pub rotation_velocity: f32,
    /// Smoothed X tilt input.
    pub tilt_delta: f32,
    /// Smoothed signed two-hand delta.
    pub expansion_delta: f32,
    /// Last frame with a hand in view.
    pub last_active_ms: Option<f64>,
    /// Idle requested for the current no-hands episode.
    pub idle_requested: bool,
    /// Hands seen on the previous frame.
    pub had_hands: bool,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            current: GestureLabel::None,
            previous: GestureLabel::None,
            entered_at_ms: 0.0,
            pinch: ActionTrigger::new(config.pinch_hold_ms, config.pinch_cooldown_ms),
            fist: ActionTrigger::new(config.fist_hold_ms, config.fist_cooldown_ms),
            rotation_velocity: 0.0,
            tilt_delta: 0.0,
            expansion_delta: 0.0,
            last_active_ms: None,
            idle_requested: false,
            had_hands: false,
        }
    }

    /// How long the current gesture has been held.
    pub fn gesture_duration(&self, now_ms: f64) -> f64 {
        (now_ms - self.entered_at_ms).max(0.0)
    }
}

// ── Step ───────────────────────────────────────────────────

/// Advance the controller by one sample, issuing actions against `model`.
pub fn step<M: TargetModel + ?Sized>(
    config: &ControllerConfig,
    state: &mut ControllerState,
    sample: &GestureSample,
    model: &mut M,
) -> Vec<ControlAction> {
    let now = sample.timestamp_ms;
    let mut actions = Vec::new();

    if sample.gesture != state.current {
        match state.current {
            GestureLabel::Pinch => state.pinch.release(now),
            GestureLabel::Fist => state.fist.release(now),
            _ => {}
        }
        debug!("Gesture: {} -> {}", state.current.as_str(), sample.gesture.as_str());
        actions.push(ControlAction::GestureChanged {
            from: state.current,
            to: sample.gesture,
        });
        state.previous = state.current;
        state.current = sample.gesture;
        state.entered_at_ms = now;
    }
    state.pinch.tick(now);
    state.fist.tick(now);
    let held_ms = state.gesture_duration(now);

    if sample.hands_detected == 0 {
        if state.had_hands {
            debug!("Controller: hands lost at {:.1}ms", now);
            state.expansion_delta = 0.0;
            state.had_hands = false;
        }
        actions.extend(decay(config, state, model));

        let since = *state.last_active_ms.get_or_insert(now);
        if !state.idle_requested && now - since > config.idle_timeout_ms {
            info!("No hands for {:.0}ms, entering idle", now - since);
            state.idle_requested = true;
            model.set_idle(true);
            actions.push(ControlAction::Idle(true));
        }
        return actions;
    }

    state.had_hands = true;
    state.last_active_ms = Some(now);
    if state.idle_requested {
        info!("Hand back in view, leaving idle");
        state.idle_requested = false;
        model.set_idle(false);
        actions.push(ControlAction::Idle(false));
    }

    if !matches!(sample.gesture, GestureLabel::Spread | GestureLabel::Squeeze) {
        state.expansion_delta = 0.0;
    }

    match sample.gesture {
        GestureLabel::TwistPose => actions.extend(rotate(config, state, sample, model)),
        GestureLabel::Pinch if sample.twist_active => actions.extend(rotate(config, state, sample, model)),
        GestureLabel::Pinch => {
            actions.extend(decay(config, state, model));
            if state.pinch.engage(held_ms, now) {
                debug!("Pinch select fired");
                select(config, 1, model, &mut actions);
            }
        }
        GestureLabel::Fist => {
            actions.extend(decay(config, state, model));
            if state.fist.engage(held_ms, now) {
                info!("Fist held {:.0}ms, resetting view", held_ms);
                model.reset_view();
                state.rotation_velocity = 0.0;
                state.tilt_delta = 0.0;
                state.expansion_delta = 0.0;
                actions.push(ControlAction::Reset);
            }
        }
        GestureLabel::Spread | GestureLabel::Squeeze => {
            actions.extend(decay(config, state, model));
            let magnitude = sample.two_hand_delta.map(f32::abs).unwrap_or(0.0);
            let signed = if sample.gesture == GestureLabel::Spread {
                magnitude
            } else {
                -magnitude
            };
            state.expansion_delta += (signed - state.expansion_delta) * config.expansion_smoothing;
            actions.extend(expand(state.expansion_delta * config.expansion_gain, model));
        }
        GestureLabel::SwipeLeft => {
            actions.extend(decay(config, state, model));
            select(config, -1, model, &mut actions);
        }
        GestureLabel::SwipeRight => {
            actions.extend(decay(config, state, model));
            select(config, 1, model, &mut actions);
        }
        GestureLabel::Point | GestureLabel::OpenPalm | GestureLabel::None => {
            actions.extend(decay(config, state, model));
        }
    }

    actions
}

/// Ramp velocity toward the twist target and apply rotation plus tilt.
fn rotate<M: TargetModel + ?Sized>(
    config: &ControllerConfig,
    state: &mut ControllerState,
    sample: &GestureSample,
    model: &mut M,
) -> Option<ControlAction> {
    let target = sample.hand_angle_delta * config.twist_sensitivity;
    state.rotation_velocity += (target - state.rotation_velocity) * config.rotation_acceleration;

    let tilt_input = sample.palm_delta.map(|d| d[1]).unwrap_or(0.0) * config.tilt_sensitivity;
    state.tilt_delta += (tilt_input - state.tilt_delta) * config.tilt_smoothing;

    apply_rotation(config, state.rotation_velocity, state.tilt_delta, model)
}

/// Bleed off rotation and tilt momentum.
fn decay<M: TargetModel + ?Sized>(
    config: &ControllerConfig,
    state: &mut ControllerState,
    model: &mut M,
) -> Option<ControlAction> {
    state.rotation_velocity *= config.momentum_decay;
    state.tilt_delta *= config.momentum_decay;
    if state.rotation_velocity.abs() < MOMENTUM_EPSILON {
        state.rotation_velocity = 0.0;
    }
    if state.tilt_delta.abs() < MOMENTUM_EPSILON {
        state.tilt_delta = 0.0;
    }
    if state.rotation_velocity == 0.0 && state.tilt_delta == 0.0 {
        return None;
    }
    apply_rotation(config, state.rotation_velocity, state.tilt_delta, model)
}

/// Write rotation to the model, clamp tilt, then sync the model's targets.
fn apply_rotation<M: TargetModel + ?Sized>(
    config: &ControllerConfig,
    delta_y: f32,
    tilt: f32,
    model: &mut M,
) -> Option<ControlAction> {
    let (_, x) = model.rotation();
    let step = tilt.clamp(-config.tilt_step_limit, config.tilt_step_limit);
    let delta_x = (x + step).clamp(-config.tilt_limit, config.tilt_limit) - x;
    if delta_y == 0.0 && delta_x == 0.0 {
        return None;
    }
    model.adjust_rotation(delta_y, delta_x);
    let (y, x) = model.rotation();
    model.set_rotation_target(y, x);
    Some(ControlAction::Rotate { delta_y, delta_x })
}

/// Apply an expansion change, reporting what the model actually took.
fn expand<M: TargetModel + ?Sized>(delta: f32, model: &mut M) -> Option<ControlAction> {
    let before = model.expansion();
    model.adjust_expansion(delta);
    let after = model.expansion();
    if after == before {
        return None;
    }
    Some(ControlAction::Expand {
        delta: after - before,
        percent: (after * 100.0).round() as u32,
    })
}

/// Move the selection and open a collapsed model so the region shows.
fn select<M: TargetModel + ?Sized>(
    config: &ControllerConfig,
    direction: i32,
    model: &mut M,
    actions: &mut Vec<ControlAction>,
) {
    let region = model.advance_selection(direction);
    actions.push(ControlAction::Select { direction, region });
    let current = model.expansion();
    if current < config.auto_expand_below {
        actions.extend(expand(config.auto_expand_to - current, model));
    }
}

// ── Controller ─────────────────────────────────────────────

/// Owns config and state; one `update` per recognizer sample.
pub struct GestureController {
    pub config: ControllerConfig,
    state: ControllerState,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl GestureController {
    pub fn new(config: ControllerConfig) -> Self {
        let state = ControllerState::new(&config);
        Self { config, state }
    }

    /// Start from an explicit state (replay and tests).
    pub fn with_state(config: ControllerConfig, state: ControllerState) -> Self {
        Self { config, state }
    }

    pub fn update<M: TargetModel + ?Sized>(&mut self, sample: &GestureSample, model: &mut M) -> Vec<ControlAction> {
        step(&self.config, &mut self.state, sample, model)
    }

    /// Push hold/cooldown settings from the config into the triggers.
    pub fn apply_config(&mut self) {
        self.state.pinch.hold_ms = self.config.pinch_hold_ms;
        self.state.pinch.cooldown_ms = self.config.pinch_cooldown_ms;
        self.state.fist.hold_ms = self.config.fist_hold_ms;
        self.state.fist.cooldown_ms = self.config.fist_cooldown_ms;
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = ControllerState::new(&self.config);
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self, now_ms: f64) -> String {
        let s = &self.state;
        format!(
            "(:gesture :{} :previous :{} :held-ms {:.0} :velocity {:.4} :tilt {:.4} :pinch :{} :fist :{} :idle {})",
            s.current.as_str(),
            s.previous.as_str(),
            s.gesture_duration(now_ms),
            s.rotation_velocity,
            s.tilt_delta,
            s.pinch.phase().as_str(),
            s.fist.phase().as_str(),
            if s.idle_requested { "t" } else { "nil" },
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let c = &self.config;
        format!(
            "(:twist-sensitivity {:.2} :rotation-acceleration {:.2} :tilt-limit {:.2} :momentum-decay {:.2} :idle-timeout-ms {:.0} :pinch-cooldown-ms {:.0} :fist-hold-ms {:.0} :fist-cooldown-ms {:.0} :expansion-gain {:.2})",
            c.twist_sensitivity,
            c.rotation_acceleration,
            c.tilt_limit,
            c.momentum_decay,
            c.idle_timeout_ms,
            c.pinch_cooldown_ms,
            c.fist_hold_ms,
            c.fist_cooldown_ms,
            c.expansion_gain,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
fn sample(t: f64, gesture: GestureLabel) -> GestureSample {
    GestureSample {
        timestamp_ms: t,
        gesture,
        raw_gesture: gesture,
        confidence: 0.9,
        hands_detected: 1,
        hand_position: Some([0.5, 0.5]),
        ..GestureSample::default()
    }
}

#[cfg(test)]
fn twist_sample(t: f64, angle_delta: f32) -> GestureSample {
    GestureSample {
        hand_angle_delta: angle_delta,
        twist_active: true,
        ..sample(t, GestureLabel::TwistPose)
    }
}
