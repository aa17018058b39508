//! Gesture recognition from hand landmark frames.
//!
//! Turns one `LandmarkFrame` into one `GestureSample`: primary-hand
//! features, twist-pose hysteresis, filtered hand-roll delta, two-hand
//! spread/squeeze, ordered single-hand classification, swipe override and
//! majority-vote stabilization.  Hand loss resets every buffer.

use std::str::FromStr;

use anyhow::bail;
use tracing::debug;

use super::features::{FingerState, HandFeatures};
use super::geometry::distance2;
use super::landmarks::{Finger, HandLandmark, LandmarkFrame};
use super::stabilizer::Stabilizer;
use super::swipe::{PalmTracker, SwipeDirection};
use super::twist::{twist_score, AngleDeltaFilter, Hysteresis};

// ── Gesture labels ─────────────────────────────────────────

/// Discrete gesture label carried by every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureLabel {
    #[default]
    None,
    /// Thumb tip against index tip.
    Pinch,
    /// All fingers curled.
    Fist,
    /// Index finger extended, others curled.
    Point,
    /// Three or more digits extended.
    OpenPalm,
    /// Thumb and index out, others curled; drives rotation.
    TwistPose,
    /// Two hands moving apart.
    Spread,
    /// Two hands moving together.
    Squeeze,
    SwipeLeft,
    SwipeRight,
}

impl GestureLabel {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pinch => "pinch",
            Self::Fist => "fist",
            Self::Point => "point",
            Self::OpenPalm => "open-palm",
            Self::TwistPose => "twist-pose",
            Self::Spread => "spread",
            Self::Squeeze => "squeeze",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeRight => "swipe-right",
        }
    }

    pub fn is_swipe(&self) -> bool {
        matches!(self, Self::SwipeLeft | Self::SwipeRight)
    }

    /// Labels an active twist pose may not override.
    pub fn is_high_priority(&self) -> bool {
        matches!(
            self,
            Self::Pinch | Self::Fist | Self::Spread | Self::Squeeze | Self::SwipeLeft | Self::SwipeRight
        )
    }
}

impl FromStr for GestureLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s {
            "none" => Self::None,
            "pinch" => Self::Pinch,
            "fist" => Self::Fist,
            "point" => Self::Point,
            "open-palm" => Self::OpenPalm,
            "twist-pose" => Self::TwistPose,
            "spread" => Self::Spread,
            "squeeze" => Self::Squeeze,
            "swipe-left" => Self::SwipeLeft,
            "swipe-right" => Self::SwipeRight,
            other => bail!("unknown gesture label: {}", other),
        })
    }
}

impl From<SwipeDirection> for GestureLabel {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => Self::SwipeLeft,
            SwipeDirection::Right => Self::SwipeRight,
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Thresholds and filter constants for recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    /// Normalized thumb-index distance below which a pinch is possible.
    pub pinch_threshold: f32,
    /// Middle-finger curl required alongside a pinch.
    pub pinch_middle_curl: f32,
    /// Curl above which index/middle/ring count as curled for a fist.
    pub fist_curl: f32,
    /// Twist-pose score to enter the pose.
    pub twist_enter: f32,
    /// Twist-pose score below which the pose is left.
    pub twist_exit: f32,
    /// EMA factor for the thumb-index roll axis.
    pub secondary_axis_smoothing: f32,
    /// Pinch distance at which the thumb-index axis fully takes over.
    pub angle_blend_near: f32,
    /// Pinch distance beyond which only the knuckle axis is used.
    pub angle_blend_far: f32,
    /// Window length for median/sigma outlier rejection.
    pub angle_history: usize,
    /// Minimum deviation from the median treated as an outlier.
    pub outlier_floor: f32,
    /// Deviation, in standard deviations, treated as an outlier.
    pub outlier_sigmas: f32,
    pub deadzone_base: f32,
    pub deadzone_max: f32,
    pub deadzone_sigmas: f32,
    /// Final low-pass factor for the hand-angle delta.
    pub angle_smoothing: f32,
    /// EMA factor for wrist-to-wrist distance.
    pub two_hand_smoothing: f32,
    /// Smoothed distance change needed to report spread/squeeze.
    pub two_hand_min_delta: f32,
    /// Confidence per unit of distance change.
    pub two_hand_confidence_gain: f32,
    /// Palm-position ring capacity.
    pub palm_history: usize,
    pub swipe_window_ms: f64,
    pub swipe_min_samples: usize,
    pub swipe_min_span_ms: f64,
    /// Horizontal speed (view units/s) required for a swipe.
    pub swipe_min_velocity: f32,
    /// Maximum |dy| / |dx| for a swipe.
    pub swipe_max_slope: f32,
    pub swipe_cooldown_ms: f64,
    pub swipe_confidence: f32,
    /// Majority-vote window length.
    pub vote_window: usize,
    /// Fraction of the window a label must hold.
    pub vote_ratio: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.35,
            pinch_middle_curl: 0.3,
            fist_curl: 0.6,
            twist_enter: 0.58,
            twist_exit: 0.42,
            secondary_axis_smoothing: 0.35,
            angle_blend_near: 0.40,
            angle_blend_far: 0.75,
            angle_history: 7,
            outlier_floor: 0.08,
            outlier_sigmas: 3.0,
            deadzone_base: 0.002,
            deadzone_max: 0.02,
            deadzone_sigmas: 1.6,
            angle_smoothing: 0.34,
            two_hand_smoothing: 0.3,
            two_hand_min_delta: 0.003,
            two_hand_confidence_gain: 15.0,
            palm_history: 20,
            swipe_window_ms: 250.0,
            swipe_min_samples: 4,
            swipe_min_span_ms: 50.0,
            swipe_min_velocity: 0.8,
            swipe_max_slope: 0.5,
            swipe_cooldown_ms: 700.0,
            swipe_confidence: 0.85,
            vote_window: 5,
            vote_ratio: 0.6,
        }
    }
}

// ── Sample ─────────────────────────────────────────────────

/// Recognizer output for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureSample {
    pub timestamp_ms: f64,
    /// Stabilized label.
    pub gesture: GestureLabel,
    /// Label before stabilization.
    pub raw_gesture: GestureLabel,
    /// Confidence in [0, 1].
    pub confidence: f32,
    /// Palm centroid of the primary hand (x, y).
    pub hand_position: Option<[f32; 2]>,
    /// Palm movement since the previous frame.
    pub palm_delta: Option<[f32; 2]>,
    /// Blended roll delta before filtering.
    pub raw_angle_delta: f32,
    /// Filtered roll delta; drives twist rotation.
    pub hand_angle_delta: f32,
    pub twist_score: f32,
    pub twist_active: bool,
    pub hands_detected: usize,
    /// Smoothed wrist-to-wrist distance.
    pub two_hand_distance: Option<f32>,
    /// Frame-to-frame change of the smoothed distance (signed).
    pub two_hand_delta: Option<f32>,
    pub fingers: Option<FingerState>,
}

impl GestureSample {
    /// Sample emitted when no hand is in view.
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    pub fn to_sexp(&self) -> String {
        let opt2 = |v: Option<[f32; 2]>| match v {
            Some([x, y]) => format!("({:.4} {:.4})", x, y),
            None => "nil".to_string(),
        };
        let opt = |v: Option<f32>| match v {
            Some(x) => format!("{:.4}", x),
            None => "nil".to_string(),
        };
        format!(
            "(:t {:.1} :gesture :{} :raw :{} :confidence {:.2} :hands {} :position {} :palm-delta {} :angle-delta {:.4} :twist-score {:.2} :twist {} :two-hand-distance {} :two-hand-delta {} :fingers {})",
            self.timestamp_ms,
            self.gesture.as_str(),
            self.raw_gesture.as_str(),
            self.confidence,
            self.hands_detected,
            opt2(self.hand_position),
            opt2(self.palm_delta),
            self.hand_angle_delta,
            self.twist_score,
            if self.twist_active { "t" } else { "nil" },
            opt(self.two_hand_distance),
            opt(self.two_hand_delta),
            self.fingers
                .map(|f| f.to_sexp())
                .unwrap_or_else(|| "nil".to_string()),
        )
    }
}

// ── Classification rules ───────────────────────────────────

/// Inputs available to a single-hand rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub features: &'a HandFeatures,
    pub twist_active: bool,
    pub config: &'a RecognizerConfig,
}

/// One predicate in the single-hand priority chain.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub label: GestureLabel,
    pub matches: fn(&RuleInput) -> bool,
}

fn is_pinch(input: &RuleInput) -> bool {
    input.features.pinch_distance < input.config.pinch_threshold
        && input.features.fingers.curl(Finger::Middle) > input.config.pinch_middle_curl
}

fn is_fist(input: &RuleInput) -> bool {
    let fingers = &input.features.fingers;
    fingers.extended_count <= 1
        && [Finger::Index, Finger::Middle, Finger::Ring]
            .iter()
            .all(|f| fingers.curl(*f) > input.config.fist_curl)
}

fn is_twist_pose(input: &RuleInput) -> bool {
    input.twist_active
}

fn is_point(input: &RuleInput) -> bool {
    let fingers = &input.features.fingers;
    fingers.extended_count == 1 && fingers.is_extended(Finger::Index)
}

fn is_open_palm(input: &RuleInput) -> bool {
    input.features.fingers.extended_count >= 3
}

/// Single-hand rules in priority order; the first match wins.
pub const CLASSIFICATION_RULES: [ClassificationRule; 5] = [
    ClassificationRule { label: GestureLabel::Pinch, matches: is_pinch },
    ClassificationRule { label: GestureLabel::Fist, matches: is_fist },
    ClassificationRule { label: GestureLabel::TwistPose, matches: is_twist_pose },
    ClassificationRule { label: GestureLabel::Point, matches: is_point },
    ClassificationRule { label: GestureLabel::OpenPalm, matches: is_open_palm },
];

/// Run the priority chain.
pub fn classify_hand(input: &RuleInput) -> GestureLabel {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(input))
        .map(|rule| rule.label)
        .unwrap_or(GestureLabel::None)
}

/// Confidence for a single-hand label.
fn hand_confidence(label: GestureLabel, features: &HandFeatures, score: f32, config: &RecognizerConfig) -> f32 {
    let fingers = &features.fingers;
    let c = match label {
        GestureLabel::Pinch => (1.0 - features.pinch_distance / config.pinch_threshold).max(0.5),
        GestureLabel::Fist => {
            (fingers.curl(Finger::Index) + fingers.curl(Finger::Middle) + fingers.curl(Finger::Ring)) / 3.0
        }
        GestureLabel::TwistPose => score,
        GestureLabel::Point => 1.0 - fingers.curl(Finger::Index),
        GestureLabel::OpenPalm => fingers.extended_count as f32 / 5.0,
        _ => 0.0,
    };
    c.clamp(0.0, 1.0)
}

// ── Two-hand tracking ──────────────────────────────────────

/// Smoothed wrist-to-wrist distance; uninitialized below two hands.
#[derive(Debug, Clone, Default)]
struct TwoHandTracker {
    smoothed: Option<f32>,
}

impl TwoHandTracker {
    /// Returns (smoothed distance, smoothed delta).
    fn update(&mut self, raw: f32, factor: f32) -> (f32, f32) {
        match self.smoothed {
            None => {
                self.smoothed = Some(raw);
                (raw, 0.0)
            }
            Some(prev) => {
                let next = prev + (raw - prev) * factor;
                self.smoothed = Some(next);
                (next, next - prev)
            }
        }
    }

    fn reset(&mut self) {
        self.smoothed = None;
    }
}

// ── Recognizer ─────────────────────────────────────────────

/// Stateful per-frame gesture classifier.
pub struct GestureRecognizer {
    pub config: RecognizerConfig,
    palm: PalmTracker,
    two_hand: TwoHandTracker,
    twist: Hysteresis,
    angle: AngleDeltaFilter,
    stabilizer: Stabilizer,
    /// Confidence attached to the current stable label.
    stable_confidence: f32,
    frames: u64,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        let stabilizer = Stabilizer::new(config.vote_window, config.vote_ratio);
        Self {
            config,
            palm: PalmTracker::new(),
            two_hand: TwoHandTracker::default(),
            twist: Hysteresis::default(),
            angle: AngleDeltaFilter::new(),
            stabilizer,
            stable_confidence: 0.0,
            frames: 0,
        }
    }

    /// Replace the config; rebuilds the vote window if its shape changed.
    pub fn set_config(&mut self, config: RecognizerConfig) {
        if config.vote_window != self.config.vote_window || config.vote_ratio != self.config.vote_ratio {
            self.stabilizer = Stabilizer::new(config.vote_window, config.vote_ratio);
        }
        self.config = config;
    }

    /// Process one frame.
    pub fn process(&mut self, frame: &LandmarkFrame) -> GestureSample {
        self.frames += 1;
        let now = frame.timestamp_ms;

        let Some(primary) = frame.primary() else {
            if self.twist.is_active() || !self.palm.is_empty() {
                debug!("Hand tracking lost at {:.1}ms, resetting recognizer", now);
            }
            self.clear_buffers();
            return GestureSample::empty(now);
        };

        let features = HandFeatures::extract(primary);

        let score = twist_score(&features);
        let twist_active = self.twist.update(score, self.config.twist_enter, self.config.twist_exit);

        let angle = self.angle.update(primary, features.pinch_distance, &self.config);

        let palm_delta = self
            .palm
            .push(features.palm[0], features.palm[1], now, self.config.palm_history);

        let mut sample = GestureSample {
            timestamp_ms: now,
            hand_position: Some([features.palm[0], features.palm[1]]),
            palm_delta,
            raw_angle_delta: angle.raw,
            hand_angle_delta: angle.filtered,
            twist_score: score,
            twist_active,
            hands_detected: frame.hand_count(),
            fingers: Some(features.fingers),
            ..GestureSample::default()
        };

        // Two-hand spread/squeeze takes priority over single-hand shapes.
        let mut raw: Option<(GestureLabel, f32)> = None;
        if let [first, second, ..] = frame.hands() {
            let dist = distance2(first.point(HandLandmark::Wrist), second.point(HandLandmark::Wrist));
            let (smoothed, delta) = self.two_hand.update(dist, self.config.two_hand_smoothing);
            sample.two_hand_distance = Some(smoothed);
            sample.two_hand_delta = Some(delta);
            if delta.abs() > self.config.two_hand_min_delta {
                let label = if delta > 0.0 {
                    GestureLabel::Spread
                } else {
                    GestureLabel::Squeeze
                };
                let confidence = (self.config.two_hand_confidence_gain * delta.abs()).min(1.0);
                raw = Some((label, confidence));
            }
        } else {
            self.two_hand.reset();
        }

        let (mut raw_label, mut raw_confidence) = raw.unwrap_or_else(|| {
            let label = classify_hand(&RuleInput {
                features: &features,
                twist_active,
                config: &self.config,
            });
            (label, hand_confidence(label, &features, score, &self.config))
        });

        // The swipe check always runs (and arms its cooldown) but only
        // overrides single-hand shapes; an active two-hand signal wins.
        let swipe = self.palm.detect_swipe(now, &self.config);
        if let (Some(swipe), None) = (swipe, raw) {
            raw_label = swipe.direction.into();
            raw_confidence = self.config.swipe_confidence;
        }

        let previous = self.stabilizer.stable();
        let stable = self.stabilizer.push(raw_label, twist_active);

        let confidence = if stable == raw_label {
            raw_confidence
        } else if stable == GestureLabel::TwistPose {
            score
        } else {
            self.stable_confidence
        };
        if !stable.is_swipe() {
            self.stable_confidence = confidence;
        }
        if stable != previous && !stable.is_swipe() {
            debug!("Stable gesture: {} -> {}", previous.as_str(), stable.as_str());
        }

        sample.gesture = stable;
        sample.raw_gesture = raw_label;
        sample.confidence = confidence;
        sample
    }

    /// Clear every buffer and latch; swipe cooldown survives.
    fn clear_buffers(&mut self) {
        self.palm.clear();
        self.two_hand.reset();
        self.twist.reset();
        self.angle.reset();
        self.stabilizer.reset();
        self.stable_confidence = 0.0;
    }

    /// Full reset, including the swipe cooldown.
    pub fn reset(&mut self) {
        self.clear_buffers();
        self.palm.reset();
        self.frames = 0;
    }

    pub fn stable_gesture(&self) -> GestureLabel {
        self.stabilizer.stable()
    }

    pub fn twist_active(&self) -> bool {
        self.twist.is_active()
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:gesture :{} :twist {} :palm-history {} :angle-history {} :frames {})",
            self.stabilizer.stable().as_str(),
            if self.twist.is_active() { "t" } else { "nil" },
            self.palm.len(),
            self.angle.history_len(),
            self.frames,
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let c = &self.config;
        format!(
            "(:pinch-threshold {:.3} :fist-curl {:.2} :twist-enter {:.2} :twist-exit {:.2} :angle-blend-near {:.2} :angle-blend-far {:.2} :angle-smoothing {:.2} :two-hand-min-delta {:.4} :swipe-min-velocity {:.2} :swipe-cooldown-ms {:.0} :vote-window {} :vote-ratio {:.2})",
            c.pinch_threshold,
            c.fist_curl,
            c.twist_enter,
            c.twist_exit,
            c.angle_blend_near,
            c.angle_blend_far,
            c.angle_smoothing,
            c.two_hand_min_delta,
            c.swipe_min_velocity,
            c.swipe_cooldown_ms,
            c.vote_window,
            c.vote_ratio,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::fixtures::{self, frame, make_hand, Pose};

    /// Feed the same pose for `n` frames, 50ms apart, returning the last sample.
    fn hold(rec: &mut GestureRecognizer, pose: Pose, start_ms: f64, n: usize) -> GestureSample {
        let mut last = GestureSample::default();
        for i in 0..n {
            let hand = make_hand(pose, [0.5, 0.6], 0.0);
            last = rec.process(&frame(start_ms + i as f64 * 50.0, vec![hand]));
        }
        last
    }

    fn raw_label(pose: Pose, twist_active: bool) -> GestureLabel {
        let features = HandFeatures::extract(&make_hand(pose, [0.5, 0.6], 0.0));
        classify_hand(&RuleInput {
            features: &features,
            twist_active,
            config: &RecognizerConfig::default(),
        })
    }

    #[test]
    fn test_rule_priority_order() {
        let order: Vec<GestureLabel> = CLASSIFICATION_RULES.iter().map(|r| r.label).collect();
        assert_eq!(
            order,
            vec![
                GestureLabel::Pinch,
                GestureLabel::Fist,
                GestureLabel::TwistPose,
                GestureLabel::Point,
                GestureLabel::OpenPalm,
            ]
        );
    }

    #[test]
    fn test_single_hand_rules() {
        assert_eq!(raw_label(fixtures::pinch(), false), GestureLabel::Pinch);
        assert_eq!(raw_label(fixtures::fist(), false), GestureLabel::Fist);
        assert_eq!(raw_label(fixtures::point(), false), GestureLabel::Point);
        assert_eq!(raw_label(fixtures::four_finger_palm(), false), GestureLabel::OpenPalm);
        assert_eq!(raw_label(fixtures::twist(), true), GestureLabel::TwistPose);
    }

    #[test]
    fn test_pinch_outranks_twist() {
        // Pinch matches before the twist latch is consulted.
        assert_eq!(raw_label(fixtures::pinch(), true), GestureLabel::Pinch);
        // Twist outranks point and open palm.
        assert_eq!(raw_label(fixtures::point(), true), GestureLabel::TwistPose);
        assert_eq!(raw_label(fixtures::four_finger_palm(), true), GestureLabel::TwistPose);
    }

    #[test]
    fn test_no_hands_sample() {
        let mut rec = GestureRecognizer::default();
        let sample = rec.process(&LandmarkFrame::empty(10.0));
        assert_eq!(sample.gesture, GestureLabel::None);
        assert_eq!(sample.confidence, 0.0);
        assert_eq!(sample.hands_detected, 0);
        assert!(sample.hand_position.is_none());
    }

    #[test]
    fn test_stable_after_three_frames() {
        let mut rec = GestureRecognizer::default();
        let s1 = hold(&mut rec, fixtures::four_finger_palm(), 0.0, 1);
        assert_eq!(s1.raw_gesture, GestureLabel::OpenPalm);
        assert_eq!(s1.gesture, GestureLabel::None);
        let s2 = hold(&mut rec, fixtures::four_finger_palm(), 50.0, 1);
        assert_eq!(s2.gesture, GestureLabel::None);
        let s3 = hold(&mut rec, fixtures::four_finger_palm(), 100.0, 1);
        assert_eq!(s3.gesture, GestureLabel::OpenPalm);
        assert!((s3.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_twist_pose_forced_immediately() {
        let mut rec = GestureRecognizer::default();
        let s = hold(&mut rec, fixtures::twist(), 0.0, 1);
        assert!(s.twist_active);
        assert_eq!(s.gesture, GestureLabel::TwistPose);
        assert!((s.confidence - s.twist_score).abs() < 1e-6);
    }

    #[test]
    fn test_loss_resets_state() {
        let mut rec = GestureRecognizer::default();
        hold(&mut rec, fixtures::twist(), 0.0, 5);
        assert!(rec.twist_active());
        let s = rec.process(&LandmarkFrame::empty(300.0));
        assert_eq!(s.gesture, GestureLabel::None);
        assert!(!rec.twist_active());
        assert_eq!(rec.stable_gesture(), GestureLabel::None);
        // Palm delta restarts after loss.
        let s = hold(&mut rec, fixtures::point(), 350.0, 1);
        assert!(s.palm_delta.is_none());
        assert_eq!(s.hand_angle_delta, 0.0);
    }

    #[test]
    fn test_palm_delta_reported() {
        let mut rec = GestureRecognizer::default();
        rec.process(&frame(0.0, vec![make_hand(fixtures::fist(), [0.5, 0.6], 0.0)]));
        let s = rec.process(&frame(50.0, vec![make_hand(fixtures::fist(), [0.5, 0.62], 0.0)]));
        let d = s.palm_delta.unwrap();
        assert!(d[0].abs() < 1e-6);
        assert!((d[1] - 0.02).abs() < 1e-5);
    }

    #[test]
    fn test_spread_and_squeeze() {
        let mut rec = GestureRecognizer::default();
        let pose = fixtures::four_finger_palm();
        let mut labels = Vec::new();
        // Hands move apart 0.03 per frame each, then together.
        for i in 0..6 {
            let gap = 0.1 + i as f32 * 0.03;
            let hands = vec![make_hand(pose, [0.5 - gap, 0.6], 0.0), make_hand(pose, [0.5 + gap, 0.6], 0.0)];
            labels.push(rec.process(&frame(i as f64 * 50.0, hands)).raw_gesture);
        }
        assert_eq!(labels[0], GestureLabel::OpenPalm);
        assert!(labels[1..].iter().all(|l| *l == GestureLabel::Spread), "{:?}", labels);

        let mut last = GestureSample::default();
        for i in 0..8 {
            let gap = 0.25 - (i + 1) as f32 * 0.03;
            let hands = vec![make_hand(pose, [0.5 - gap, 0.6], 0.0), make_hand(pose, [0.5 + gap, 0.6], 0.0)];
            last = rec.process(&frame(300.0 + i as f64 * 50.0, hands));
        }
        assert_eq!(last.gesture, GestureLabel::Squeeze);
        assert!(last.two_hand_delta.unwrap() < 0.0);
        assert!(last.confidence > 0.0 && last.confidence <= 1.0);
    }

    #[test]
    fn test_fast_spread_not_swipe() {
        let mut rec = GestureRecognizer::default();
        let pose = fixtures::four_finger_palm();
        let mut samples = Vec::new();
        // 0.05 per 50ms puts the primary palm at 1.0/s, above swipe speed.
        for i in 0..6 {
            let gap = 0.1 + i as f32 * 0.05;
            let hands = vec![make_hand(pose, [0.5 - gap, 0.6], 0.0), make_hand(pose, [0.5 + gap, 0.6], 0.0)];
            samples.push(rec.process(&frame(i as f64 * 50.0, hands)));
        }
        let raw: Vec<GestureLabel> = samples.iter().map(|s| s.raw_gesture).collect();
        assert!(raw[1..].iter().all(|l| *l == GestureLabel::Spread), "{:?}", raw);
        for s in &samples {
            assert!(!s.raw_gesture.is_swipe() && !s.gesture.is_swipe(), "{:?}", s.raw_gesture);
        }
        assert_eq!(samples[5].gesture, GestureLabel::Spread);
    }

    #[test]
    fn test_two_hand_outranks_hand_shapes() {
        for pose in [fixtures::fist(), fixtures::pinch()] {
            let mut rec = GestureRecognizer::default();
            let mut raw = Vec::new();
            for i in 0..6 {
                let gap = 0.1 + i as f32 * 0.03;
                let hands = vec![make_hand(pose, [0.5 - gap, 0.6], 0.0), make_hand(pose, [0.5 + gap, 0.6], 0.0)];
                raw.push(rec.process(&frame(i as f64 * 50.0, hands)).raw_gesture);
            }
            // First frame has no delta yet and falls back to the hand shape.
            assert_ne!(raw[0], GestureLabel::Spread);
            assert!(raw[1..].iter().all(|l| *l == GestureLabel::Spread), "{:?}", raw);
        }
    }

    #[test]
    fn test_two_hand_state_resets_on_single_hand() {
        let mut rec = GestureRecognizer::default();
        let pose = fixtures::four_finger_palm();
        let pair = |gap: f32| vec![make_hand(pose, [0.5 - gap, 0.6], 0.0), make_hand(pose, [0.5 + gap, 0.6], 0.0)];
        rec.process(&frame(0.0, pair(0.1)));
        rec.process(&frame(50.0, vec![make_hand(pose, [0.5, 0.6], 0.0)]));
        // First two-hand frame after reset initializes: no delta.
        let s = rec.process(&frame(100.0, pair(0.3)));
        assert_eq!(s.two_hand_delta, Some(0.0));
        assert_ne!(s.raw_gesture, GestureLabel::Spread);
    }

    #[test]
    fn test_still_hands_not_spread() {
        let mut rec = GestureRecognizer::default();
        let pose = fixtures::four_finger_palm();
        let mut last = GestureSample::default();
        for i in 0..6 {
            let hands = vec![make_hand(pose, [0.3, 0.6], 0.0), make_hand(pose, [0.7, 0.6], 0.0)];
            last = rec.process(&frame(i as f64 * 50.0, hands));
        }
        assert_eq!(last.gesture, GestureLabel::OpenPalm);
        assert_eq!(last.hands_detected, 2);
        assert!((last.two_hand_distance.unwrap() - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_swipe_overrides_shape() {
        let mut rec = GestureRecognizer::default();
        let mut samples = Vec::new();
        for i in 0..4 {
            let hand = make_hand(fixtures::four_finger_palm(), [0.2 + i as f32 * 0.075, 0.6], 0.0);
            samples.push(rec.process(&frame(i as f64 * 50.0, vec![hand])));
        }
        let last = samples.last().unwrap();
        assert_eq!(last.gesture, GestureLabel::SwipeRight);
        assert!((last.confidence - 0.85).abs() < 1e-6);
        // The next frame falls back to the shape vote.
        let hand = make_hand(fixtures::four_finger_palm(), [0.425, 0.6], 0.0);
        let next = rec.process(&frame(200.0, vec![hand]));
        assert_eq!(next.gesture, GestureLabel::OpenPalm);
        assert!(next.palm_delta.is_none());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let run = || {
            let mut rec = GestureRecognizer::default();
            (0..40)
                .map(|i| {
                    let pose = if i % 10 < 6 { fixtures::twist() } else { fixtures::point() };
                    let hand = make_hand(pose, [0.5, 0.6], i as f32 * 0.03);
                    rec.process(&frame(i as f64 * 50.0, vec![hand]))
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_label_roundtrip() {
        for label in [
            GestureLabel::None,
            GestureLabel::Pinch,
            GestureLabel::OpenPalm,
            GestureLabel::TwistPose,
            GestureLabel::SwipeLeft,
        ] {
            assert_eq!(label.as_str().parse::<GestureLabel>().unwrap(), label);
        }
        let err = "wave".parse::<GestureLabel>().unwrap_err();
        assert!(err.to_string().contains("wave"));
    }

    #[test]
    fn test_status_and_config_sexp() {
        let rec = GestureRecognizer::default();
        assert!(rec.status_sexp().contains(":gesture :none"));
        let config = rec.config_sexp();
        assert!(config.contains(":twist-enter 0.58"));
        assert!(config.contains(":angle-blend-near 0.40"));
        assert!(config.contains(":vote-window 5"));
    }
}
