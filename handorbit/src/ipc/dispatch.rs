//! IPC message dispatch: parse s-expressions and route to handlers.

use lexpr::Value;
use tracing::{debug, warn};

use super::frame::parse_frame;
use super::sexp::{error_response, get_float, get_int, get_keyword, ok_response};
use crate::state::Session;

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns an optional response string (s-expression).
pub fn handle_message(session: &mut Session, raw: &str) -> Option<String> {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Some(error_response(0, &format!("malformed s-expression: {e}")));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(session, msg_id, &value),
        Some("gesture-status") => handle_gesture_status(session, msg_id),
        Some("gesture-config") => handle_gesture_config(session, msg_id, &value),
        Some("gesture-reset") => handle_gesture_reset(session, msg_id),
        Some(other) => Some(error_response(msg_id, &format!("unknown message type: {other}"))),
        None => Some(error_response(msg_id, "missing :type field")),
    }
}

// ── Handlers ────────────────────────────────────────────────

fn handle_frame(session: &mut Session, msg_id: i64, value: &Value) -> Option<String> {
    let frame = match parse_frame(value) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("rejecting frame: {:#}", e);
            return Some(error_response(msg_id, &format!("{e:#}")));
        }
    };

    let outcome = session.process_frame(&frame);
    Some(format!(
        "(:type :response :id {} :status :ok :sample {} :actions {} :expansion {} :hands {})",
        msg_id,
        outcome.sample.to_sexp(),
        outcome.actions_sexp(),
        session.scene.expansion_percent(),
        outcome.sample.hands_detected,
    ))
}

fn handle_gesture_status(session: &mut Session, msg_id: i64) -> Option<String> {
    Some(format!(
        "(:type :response :id {} :status :ok :gesture {})",
        msg_id,
        session.status_sexp()
    ))
}

fn handle_gesture_config(session: &mut Session, msg_id: i64, value: &Value) -> Option<String> {
    let f32_of = |key: &str| get_float(value, key).map(|v| v as f32);

    let mut rc = session.recognizer.config.clone();
    if let Some(v) = f32_of("pinch-threshold") {
        rc.pinch_threshold = v;
    }
    if let Some(v) = f32_of("fist-curl") {
        rc.fist_curl = v;
    }
    if let Some(v) = f32_of("twist-enter") {
        rc.twist_enter = v;
    }
    if let Some(v) = f32_of("twist-exit") {
        rc.twist_exit = v;
    }
    if let Some(v) = f32_of("angle-blend-near") {
        rc.angle_blend_near = v;
    }
    if let Some(v) = f32_of("angle-blend-far") {
        rc.angle_blend_far = v;
    }
    if let Some(v) = f32_of("angle-smoothing") {
        rc.angle_smoothing = v;
    }
    if let Some(v) = f32_of("two-hand-min-delta") {
        rc.two_hand_min_delta = v;
    }
    if let Some(v) = f32_of("swipe-min-velocity") {
        rc.swipe_min_velocity = v;
    }
    if let Some(v) = get_float(value, "swipe-cooldown-ms") {
        rc.swipe_cooldown_ms = v;
    }
    if let Some(v) = get_int(value, "vote-window") {
        rc.vote_window = v.max(1) as usize;
    }
    if let Some(v) = f32_of("vote-ratio") {
        rc.vote_ratio = v;
    }

    let mut cc = session.controller.config.clone();
    if let Some(v) = f32_of("twist-sensitivity") {
        cc.twist_sensitivity = v;
    }
    if let Some(v) = f32_of("rotation-acceleration") {
        cc.rotation_acceleration = v;
    }
    if let Some(v) = f32_of("tilt-limit") {
        cc.tilt_limit = v;
    }
    if let Some(v) = f32_of("momentum-decay") {
        cc.momentum_decay = v;
    }
    if let Some(v) = get_float(value, "idle-timeout-ms") {
        cc.idle_timeout_ms = v;
    }
    if let Some(v) = get_float(value, "pinch-cooldown-ms") {
        cc.pinch_cooldown_ms = v;
    }
    if let Some(v) = get_float(value, "fist-hold-ms") {
        cc.fist_hold_ms = v;
    }
    if let Some(v) = get_float(value, "fist-cooldown-ms") {
        cc.fist_cooldown_ms = v;
    }
    if let Some(v) = f32_of("expansion-gain") {
        cc.expansion_gain = v;
    }

    if rc.twist_exit > rc.twist_enter {
        return Some(error_response(msg_id, "twist-exit must not exceed twist-enter"));
    }
    if rc.angle_blend_near >= rc.angle_blend_far {
        return Some(error_response(msg_id, "angle-blend-near must be below angle-blend-far"));
    }
    if !(0.0..=1.0).contains(&cc.momentum_decay) {
        return Some(error_response(msg_id, "momentum-decay must be in [0, 1]"));
    }

    session.recognizer.set_config(rc);
    session.controller.config = cc;
    session.controller.apply_config();
    debug!("gesture config updated");

    Some(format!(
        "(:type :response :id {} :status :ok :config {})",
        msg_id,
        session.config_sexp()
    ))
}

fn handle_gesture_reset(session: &mut Session, msg_id: i64) -> Option<String> {
    session.reset();
    Some(ok_response(msg_id))
}

// ── Tests ──────────────────────────────────────────────────
