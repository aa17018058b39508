//! Hand landmark data as delivered by the external hand tracker.
//!
//! Models the 21-point hand layout (wrist plus four joints per digit) in
//! camera-normalized coordinates.  Frames carry zero, one or two hands;
//! index 0 is the primary hand.

use tracing::debug;

// ── Landmark definitions ───────────────────────────────────

/// The 21 tracked hand landmarks, in tracker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Maximum number of hands a frame may carry.
pub const MAX_HANDS: usize = 2;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ── Fingers ────────────────────────────────────────────────

/// The four non-thumb fingers, each with a pip and tip landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Proximal interphalangeal joint.
    pub fn pip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexPip,
            Self::Middle => HandLandmark::MiddlePip,
            Self::Ring => HandLandmark::RingPip,
            Self::Pinky => HandLandmark::PinkyPip,
        }
    }

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

// ── Hand ───────────────────────────────────────────────────

/// One tracked hand: 21 points, immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    points: [[f32; 3]; LANDMARK_COUNT],
}

impl Hand {
    /// Build a hand from tracker output.
    ///
    /// Returns `None` unless `points` holds exactly 21 finite triples.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            debug!(
                "Hand landmarks: expected {} points, got {}",
                LANDMARK_COUNT,
                points.len(),
            );
            return None;
        }
        if points.iter().flatten().any(|c| !c.is_finite()) {
            debug!("Hand landmarks: non-finite coordinate, dropping hand");
            return None;
        }
        let mut out = [[0.0; 3]; LANDMARK_COUNT];
        out.copy_from_slice(points);
        Some(Self { points: out })
    }

    /// Position of a single landmark.
    pub fn point(&self, landmark: HandLandmark) -> [f32; 3] {
        self.points[landmark.index()]
    }

    pub fn points(&self) -> &[[f32; 3]; LANDMARK_COUNT] {
        &self.points
    }
}

// ── Frame ──────────────────────────────────────────────────

/// One detection cycle from the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: f64,
    hands: Vec<Hand>,
}

impl LandmarkFrame {
    /// Create a frame, keeping at most two hands.
    pub fn new(timestamp_ms: f64, mut hands: Vec<Hand>) -> Self {
        if hands.len() > MAX_HANDS {
            debug!("Frame carries {} hands, keeping first {}", hands.len(), MAX_HANDS);
            hands.truncate(MAX_HANDS);
        }
        Self { timestamp_ms, hands }
    }

    /// A frame with no hands in view.
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    /// Zero, one or two hands; index 0 is the primary hand.
    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn primary(&self) -> Option<&Hand> {
        self.hands.first()
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }
}

// ── Test fixtures ──────────────────────────────────────────


// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::fixtures::{fist, make_hand, point};
    use super::*;

    #[test]
    fn test_landmark_count() {
        assert_eq!(HandLandmark::Wrist.index(), 0);
        assert_eq!(HandLandmark::ThumbTip.index(), 4);
        assert_eq!(HandLandmark::MiddleMcp.index(), 9);
        assert_eq!(HandLandmark::PinkyTip.index(), 20);
        assert_eq!(LANDMARK_COUNT, 21);
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(Finger::Index.pip(), HandLandmark::IndexPip);
        assert_eq!(Finger::Ring.tip(), HandLandmark::RingTip);
        assert_eq!(Finger::Pinky.pip().index(), 18);
    }

    #[test]
    fn test_hand_wrong_point_count() {
        let points = vec![[0.0; 3]; 10];
        assert!(Hand::from_points(&points).is_none());
    }

    #[test]
    fn test_hand_rejects_nan() {
        let mut points = vec![[0.5; 3]; LANDMARK_COUNT];
        points[7][1] = f32::NAN;
        assert!(Hand::from_points(&points).is_none());
    }

    #[test]
    fn test_hand_point_lookup() {
        let points: Vec<[f32; 3]> = (0..LANDMARK_COUNT)
            .map(|i| [i as f32 * 0.01, 0.5, 0.0])
            .collect();
        let hand = Hand::from_points(&points).unwrap();
        assert_eq!(hand.point(HandLandmark::IndexTip), [0.08, 0.5, 0.0]);
    }

    #[test]
    fn test_frame_truncates_extra_hands() {
        let hand = Hand::from_points(&[[0.1; 3]; LANDMARK_COUNT]).unwrap();
        let frame = LandmarkFrame::new(0.0, vec![hand.clone(), hand.clone(), hand]);
        assert_eq!(frame.hand_count(), 2);
    }

    #[test]
    fn test_empty_frame() {
        let frame = LandmarkFrame::empty(42.0);
        assert!(frame.primary().is_none());
        assert_eq!(frame.hand_count(), 0);
    }

    #[test]
    fn test_frame_keeps_hand_order() {
        let left = make_hand(fist(), [0.3, 0.6], 0.0);
        let right = make_hand(point(), [0.7, 0.6], 0.0);
        let frame = LandmarkFrame::new(0.0, vec![left.clone(), right.clone()]);
        assert_eq!(frame.hands(), &[left.clone(), right][..]);
        assert_eq!(frame.primary(), Some(&left));
        assert!(LandmarkFrame::empty(5.0).hands().is_empty());
    }
}
