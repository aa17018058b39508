//! Landmark frame decoding.
//!
//! A frame message carries a timestamp and up to two hands, each a list of
//! 63 numbers (21 x/y/z triples, optionally grouped as 21 sublists):
//!
//! ```text
//! (:type :frame :t 1234.5 :hands ((0.51 0.62 0.0 ...) (...)))
//! ```
//!
//! Hands that are not exactly 21 finite triples are dropped; the frame
//! still decodes with whatever hands remain.

use anyhow::{bail, Context};
use lexpr::Value;
use tracing::warn;

use super::sexp::{flatten_list, get_float, get_value, is_nil, list_items};
use crate::gesture::landmarks::{Hand, LandmarkFrame, LANDMARK_COUNT};

/// Decode a `:frame` message into a `LandmarkFrame`.
pub fn parse_frame(value: &Value) -> anyhow::Result<LandmarkFrame> {
    let timestamp_ms = get_float(value, "t").context("frame is missing a numeric :t")?;
    if !timestamp_ms.is_finite() {
        bail!("frame timestamp is not finite: {}", timestamp_ms);
    }

    let hands = match get_value(value, "hands") {
        None => Vec::new(),
        Some(list) if is_nil(list) => Vec::new(),
        Some(list) => {
            let items = list_items(list).context(":hands is not a list")?;
            items
                .into_iter()
                .enumerate()
                .filter_map(|(i, hand)| match parse_hand(hand) {
                    Ok(hand) => Some(hand),
                    Err(e) => {
                        warn!("dropping hand {} at {:.1}ms: {:#}", i, timestamp_ms, e);
                        None
                    }
                })
                .collect()
        }
    };

    Ok(LandmarkFrame::new(timestamp_ms, hands))
}

/// Decode one hand from a flat or triple-grouped coordinate list.
fn parse_hand(value: &Value) -> anyhow::Result<Hand> {
    let coords = flatten_list(value)
        .into_iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64().map(|f| f as f32).context("coordinate out of range"),
            other => bail!("coordinate is not a number: {}", other),
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;

    if coords.len() != LANDMARK_COUNT * 3 {
        bail!("expected {} coordinates, got {}", LANDMARK_COUNT * 3, coords.len());
    }
    let points: Vec<[f32; 3]> = coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    Hand::from_points(&points).context("hand has non-finite coordinates")
}

/// Encode a hand as a flat coordinate list.
pub fn hand_to_sexp(hand: &Hand) -> String {
    let coords: Vec<String> = hand
        .points()
        .iter()
        .flat_map(|p| p.iter().map(|c| format!("{:.5}", c)))
        .collect();
    format!("({})", coords.join(" "))
}

/// Encode a full frame message.
pub fn frame_to_sexp(frame: &LandmarkFrame) -> String {
    let hands: Vec<String> = frame.hands().iter().map(hand_to_sexp).collect();
    format!("(:type :frame :t {:.1} :hands ({}))", frame.timestamp_ms, hands.join(" "))
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::fixtures::{self, make_hand};
    use crate::gesture::landmarks::HandLandmark;

    fn parse(raw: &str) -> anyhow::Result<LandmarkFrame> {
        parse_frame(&lexpr::from_str(raw).unwrap())
    }

    fn flat(n: usize) -> String {
        let coords: Vec<String> = (0..n).map(|i| format!("{}", i as f32 * 0.01)).collect();
        format!("({})", coords.join(" "))
    }

    #[test]
    fn test_parse_flat_hand() {
        let frame = parse(&format!("(:type :frame :t 100 :hands ({}))", flat(63))).unwrap();
        assert_eq!(frame.timestamp_ms, 100.0);
        assert_eq!(frame.hand_count(), 1);
        let tip = frame.hands()[0].point(HandLandmark::PinkyTip);
        assert!((tip[0] - 0.60).abs() < 1e-5);
        assert!((tip[2] - 0.62).abs() < 1e-5);
    }

    #[test]
    fn test_parse_grouped_hand() {
        let triples: Vec<String> = (0..21).map(|i| format!("({} 0.5 0)", i as f32 * 0.01)).collect();
        let raw = format!("(:type :frame :t 5 :hands (({})))", triples.join(" "));
        let frame = parse(&raw).unwrap();
        assert_eq!(frame.hand_count(), 1);
        assert!((frame.hands()[0].point(HandLandmark::IndexMcp)[0] - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_short_hand_dropped() {
        let raw = format!("(:type :frame :t 0 :hands ({} {}))", flat(60), flat(63));
        let frame = parse(&raw).unwrap();
        assert_eq!(frame.hand_count(), 1);
    }

    #[test]
    fn test_non_numeric_hand_dropped() {
        let mut coords = flat(63);
        coords.insert_str(1, "foo ");
        let raw = format!("(:type :frame :t 0 :hands ({}))", coords);
        assert_eq!(parse(&raw).unwrap().hand_count(), 0);
    }

    #[test]
    fn test_empty_and_missing_hands() {
        assert_eq!(parse("(:type :frame :t 3 :hands ())").unwrap().hand_count(), 0);
        assert_eq!(parse("(:type :frame :t 3 :hands nil)").unwrap().hand_count(), 0);
        assert_eq!(parse("(:type :frame :t 3)").unwrap().hand_count(), 0);
    }

    #[test]
    fn test_missing_timestamp_is_error() {
        let err = parse("(:type :frame :hands ())").unwrap_err();
        assert!(format!("{:#}", err).contains(":t"));
    }

    #[test]
    fn test_hands_not_a_list() {
        assert!(parse("(:type :frame :t 1 :hands 7)").is_err());
    }

    #[test]
    fn test_extra_hands_truncated() {
        let raw = format!("(:type :frame :t 0 :hands ({0} {0} {0}))", flat(63));
        assert_eq!(parse(&raw).unwrap().hand_count(), 2);
    }

    #[test]
    fn test_encode_decode_fixture() {
        let hand = make_hand(fixtures::fist(), [0.4, 0.6], 0.2);
        let original = LandmarkFrame::new(42.0, vec![hand]);
        let decoded = parse(&frame_to_sexp(&original)).unwrap();
        assert_eq!(decoded.timestamp_ms, 42.0);
        for (a, b) in original.hands()[0].points().iter().zip(decoded.hands()[0].points()) {
            for k in 0..3 {
                assert!((a[k] - b[k]).abs() < 1e-4);
            }
        }
    }
}
