//! Handorbit: hand-landmark gesture recognition driving a 3D model.
//!
//! Landmark frames from an external tracker go through the gesture
//! recognizer and controller; the controller rotates, selects, resets and
//! explodes a `TargetModel`.

pub mod gesture;
pub mod ipc;
pub mod scene;
pub mod state;
