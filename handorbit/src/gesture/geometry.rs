//! Geometry primitives over hand landmarks.
//!
//! Pure helpers: distances, palm-size normalization, finger curl, thumb
//! extension, line angles, angle wraparound and small-window statistics.

use std::f32::consts::PI;

use super::landmarks::{Finger, Hand, HandLandmark};

/// Floor applied to palm size and pip distances before dividing.
pub const MIN_SEGMENT: f32 = 0.001;

/// Euclidean distance between two 3D points.
pub fn distance3(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance in the image plane (x, y only).
pub fn distance2(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Wrist to middle-finger base, floored so it is always safe to divide by.
pub fn palm_size(hand: &Hand) -> f32 {
    distance3(hand.point(HandLandmark::Wrist), hand.point(HandLandmark::MiddleMcp)).max(MIN_SEGMENT)
}

/// Centroid of wrist, index MCP and pinky MCP.
pub fn palm_center(hand: &Hand) -> [f32; 3] {
    let w = hand.point(HandLandmark::Wrist);
    let i = hand.point(HandLandmark::IndexMcp);
    let p = hand.point(HandLandmark::PinkyMcp);
    [
        (w[0] + i[0] + p[0]) / 3.0,
        (w[1] + i[1] + p[1]) / 3.0,
        (w[2] + i[2] + p[2]) / 3.0,
    ]
}

/// Curl of one finger: 0 = fully extended, 1 = fully curled.
///
/// Compares the tip-to-wrist distance against the pip-to-wrist distance.
/// A degenerate pip (collapsed onto the wrist) reads as extended.
pub fn finger_curl(hand: &Hand, pip: HandLandmark, tip: HandLandmark) -> f32 {
    let wrist = hand.point(HandLandmark::Wrist);
    let pip_dist = distance3(hand.point(pip), wrist);
    if pip_dist < MIN_SEGMENT {
        return 0.0;
    }
    let ratio = distance3(hand.point(tip), wrist) / pip_dist;
    clamp01((1.15 - ratio) / 0.5)
}

/// Curl for a named finger.
pub fn curl_of(hand: &Hand, finger: Finger) -> f32 {
    finger_curl(hand, finger.pip(), finger.tip())
}

/// Thumb tip sits well outside the palm compared to the thumb base.
pub fn thumb_extended(hand: &Hand) -> bool {
    let center = palm_center(hand);
    let tip = distance3(hand.point(HandLandmark::ThumbTip), center);
    let base = distance3(hand.point(HandLandmark::ThumbMcp), center);
    tip > base * 1.3
}

/// Angle (radians) of the line from `from` to `to` in the image plane.
pub fn line_angle(from: [f32; 3], to: [f32; 3]) -> f32 {
    (to[1] - from[1]).atan2(to[0] - from[0])
}

/// Fold an angle difference into (-PI, PI].
///
/// A single correction is enough because both inputs come from `atan2`.
pub fn wrap_angle_delta(delta: f32) -> f32 {
    if delta > PI {
        delta - 2.0 * PI
    } else if delta <= -PI {
        delta + 2.0 * PI
    } else {
        delta
    }
}

/// Median of a small window; even counts average the middle pair.
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

// ── Tests ──────────────────────────────────────────────────
