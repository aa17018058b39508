//! Hand gesture pipeline.
//!
//! Provides:
//! - `landmarks`: 21-point hand skeleton and per-frame input
//! - `geometry`, `features`: distances, curls, wrapped angles, finger state
//! - `twist`, `swipe`, `stabilizer`: twist-pose latch and hand-roll filter,
//!   palm-velocity swipes, majority-vote smoothing
//! - `recognizer`: frame in, `GestureSample` out
//! - `trigger`, `controller`: debounced actions and rotation momentum
//!   against a `TargetModel`

pub mod controller;
pub mod features;
pub mod geometry;
pub mod landmarks;
pub mod recognizer;
pub mod stabilizer;
pub mod swipe;
pub mod trigger;
pub mod twist;

pub use controller::{ControlAction, ControllerConfig, ControllerState, GestureController};
pub use landmarks::{Hand, HandLandmark, LandmarkFrame};
pub use recognizer::{GestureLabel, GestureRecognizer, GestureSample, RecognizerConfig};
