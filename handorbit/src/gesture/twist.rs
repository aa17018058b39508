//! Twist-pose scoring and the hand-roll angle-delta filter.
//!
//! The twist score is a continuous measure of "thumb and index out, other
//! fingers curled", latched through a hysteresis band.  The angle filter
//! turns two noisy roll axes into one smooth per-frame rotation delta:
//! wraparound correction, secondary-axis smoothing, pinch-weighted blend,
//! median outlier rejection, adaptive deadzone and a final low-pass.

use std::collections::VecDeque;

use super::features::HandFeatures;
use super::geometry::{clamp01, line_angle, median, std_dev, wrap_angle_delta};
use super::landmarks::{Finger, Hand, HandLandmark};
use super::recognizer::RecognizerConfig;

// ── Twist score ────────────────────────────────────────────

const THUMB_WEIGHT: f32 = 0.34;
const INDEX_WEIGHT: f32 = 0.34;
const TRAILING_CURL_WEIGHT: f32 = 0.18;
const CLOSE_PINCH_WEIGHT: f32 = 0.18;

/// Pinch distance that still counts as a thumb contribution.
const THUMB_PINCH_DISTANCE: f32 = 0.72;
/// Index curl that still counts as an index contribution.
const INDEX_LOOSE_CURL: f32 = 0.55;
/// Pinch distance that earns the close-pinch bonus.
const CLOSE_PINCH_DISTANCE: f32 = 0.55;

/// Continuous twist-pose score in [0, 1].
pub fn twist_score(features: &HandFeatures) -> f32 {
    let fingers = &features.fingers;
    let mut score = 0.0;
    if fingers.thumb_extended || features.pinch_distance < THUMB_PINCH_DISTANCE {
        score += THUMB_WEIGHT;
    }
    if fingers.is_extended(Finger::Index) || fingers.curl(Finger::Index) < INDEX_LOOSE_CURL {
        score += INDEX_WEIGHT;
    }
    score += TRAILING_CURL_WEIGHT * fingers.trailing_curl();
    if features.pinch_distance < CLOSE_PINCH_DISTANCE {
        score += CLOSE_PINCH_WEIGHT;
    }
    clamp01(score)
}

// ── Hysteresis ─────────────────────────────────────────────

/// Boolean latch with separate enter and exit thresholds.
#[derive(Debug, Clone, Default)]
pub struct Hysteresis {
    active: bool,
}

impl Hysteresis {
    /// Enter at `score >= enter`, leave at `score < exit`, hold in between.
    pub fn update(&mut self, score: f32, enter: f32, exit: f32) -> bool {
        if !self.active && score >= enter {
            self.active = true;
        } else if self.active && score < exit {
            self.active = false;
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = false;
    }
}

// ── Angle-delta filter ─────────────────────────────────────

/// Output of one filter step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleDelta {
    /// Blended delta before outlier rejection and smoothing.
    pub raw: f32,
    /// Final smoothed delta used for rotation.
    pub filtered: f32,
}

/// Weight of the thumb-index axis: 0 at or beyond `far`, 1 at or below `near`.
pub fn pinch_axis_weight(pinch_distance: f32, near: f32, far: f32) -> f32 {
    if far <= near {
        return if pinch_distance <= near { 1.0 } else { 0.0 };
    }
    clamp01((far - pinch_distance) / (far - near))
}

/// Dual-axis roll filter state.  Reset whenever tracking is lost.
#[derive(Debug, Clone, Default)]
pub struct AngleDeltaFilter {
    prev_primary: Option<f32>,
    prev_secondary: Option<f32>,
    secondary_smoothed: f32,
    /// Recent blended deltas for median/sigma (bounded by config).
    history: VecDeque<f32>,
    filtered: f32,
}

impl AngleDeltaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the primary hand for this frame.
    pub fn update(&mut self, hand: &Hand, pinch_distance: f32, config: &RecognizerConfig) -> AngleDelta {
        // Knuckle line: index base to pinky base.
        let primary = line_angle(hand.point(HandLandmark::IndexMcp), hand.point(HandLandmark::PinkyMcp));
        // Pinch line: thumb tip to index tip.
        let secondary = line_angle(hand.point(HandLandmark::ThumbTip), hand.point(HandLandmark::IndexTip));

        let primary_delta = self
            .prev_primary
            .map(|prev| wrap_angle_delta(primary - prev))
            .unwrap_or(0.0);
        let secondary_delta = self
            .prev_secondary
            .map(|prev| wrap_angle_delta(secondary - prev))
            .unwrap_or(0.0);
        self.prev_primary = Some(primary);
        self.prev_secondary = Some(secondary);

        self.secondary_smoothed += (secondary_delta - self.secondary_smoothed) * config.secondary_axis_smoothing;

        let w = pinch_axis_weight(pinch_distance, config.angle_blend_near, config.angle_blend_far);
        let raw = primary_delta * (1.0 - w) + self.secondary_smoothed * w;

        AngleDelta {
            raw,
            filtered: self.push_delta(raw, config),
        }
    }

    /// Outlier rejection, adaptive deadzone and low-pass on one blended delta.
    fn push_delta(&mut self, raw: f32, config: &RecognizerConfig) -> f32 {
        self.history.push_back(raw);
        while self.history.len() > config.angle_history.max(1) {
            self.history.pop_front();
        }

        let window: &[f32] = self.history.make_contiguous();
        let med = median(window);
        let sigma = std_dev(window);

        let mut delta = raw;
        if (delta - med).abs() > config.outlier_floor.max(config.outlier_sigmas * sigma) {
            delta = med;
        }

        let deadzone = config.deadzone_base + config.deadzone_max.min(config.deadzone_sigmas * sigma);
        if delta.abs() < deadzone {
            delta = 0.0;
        }

        self.filtered += (delta - self.filtered) * config.angle_smoothing;
        self.filtered
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Tests ──────────────────────────────────────────────────
