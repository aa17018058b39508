//! Per-frame feature extraction for the primary hand.

use super::geometry::{curl_of, distance3, palm_center, palm_size, thumb_extended};
use super::landmarks::{Finger, Hand, HandLandmark};

/// Curl below which a finger counts as extended.
pub const EXTENDED_CURL: f32 = 0.4;

/// Finger shape summary exposed on every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerState {
    /// Curl per finger (index, middle, ring, pinky), 0 = extended, 1 = curled.
    pub curls: [f32; 4],
    /// Extended flag per finger (index, middle, ring, pinky).
    pub extended: [bool; 4],
    pub thumb_extended: bool,
    /// Extended digits including the thumb (0-5).
    pub extended_count: usize,
}

impl FingerState {
    pub fn curl(&self, finger: Finger) -> f32 {
        self.curls[finger as usize]
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger as usize]
    }

    /// Mean curl of middle, ring and pinky.
    pub fn trailing_curl(&self) -> f32 {
        (self.curls[1] + self.curls[2] + self.curls[3]) / 3.0
    }

    pub fn to_sexp(&self) -> String {
        let curls: String = Finger::ALL
            .iter()
            .map(|f| format!(" :{} {:.2}", f.as_str(), self.curl(*f)))
            .collect();
        format!(
            "(:thumb {}{} :extended {})",
            if self.thumb_extended { "t" } else { "nil" },
            curls,
            self.extended_count,
        )
    }
}

/// Geometric features of one hand in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    /// Centroid of wrist, index MCP and pinky MCP.
    pub palm: [f32; 3],
    pub palm_size: f32,
    pub fingers: FingerState,
    /// Thumb tip to index tip, in palm sizes.
    pub pinch_distance: f32,
}

impl HandFeatures {
    pub fn extract(hand: &Hand) -> Self {
        let size = palm_size(hand);
        let mut curls = [0.0; 4];
        let mut extended = [false; 4];
        for (i, finger) in Finger::ALL.iter().enumerate() {
            curls[i] = curl_of(hand, *finger);
            extended[i] = curls[i] < EXTENDED_CURL;
        }
        let thumb = thumb_extended(hand);
        let extended_count = extended.iter().filter(|e| **e).count() + usize::from(thumb);
        let pinch = distance3(hand.point(HandLandmark::ThumbTip), hand.point(HandLandmark::IndexTip));

        Self {
            palm: palm_center(hand),
            palm_size: size,
            fingers: FingerState {
                curls,
                extended,
                thumb_extended: thumb,
                extended_count,
            },
            pinch_distance: pinch / size,
        }
    }
}
