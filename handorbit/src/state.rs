//! Session state: one recognizer, one controller, one target model.
//!
//! A single `Session` owns the whole pipeline and is passed as `&mut` to
//! the IPC handlers.  Frames go in one at a time; each produces a sample
//! and the actions it caused.

use tracing::info;

use crate::gesture::{
    ControlAction, ControllerConfig, GestureController, GestureRecognizer, GestureSample, LandmarkFrame,
    RecognizerConfig,
};
use crate::scene::SceneModel;

/// Result of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub sample: GestureSample,
    pub actions: Vec<ControlAction>,
}

impl FrameOutcome {
    /// Render the actions as an s-expression list.
    pub fn actions_sexp(&self) -> String {
        let items: Vec<String> = self.actions.iter().map(|a| a.to_sexp()).collect();
        format!("({})", items.join(" "))
    }
}

pub struct Session {
    pub recognizer: GestureRecognizer,
    pub controller: GestureController,
    pub scene: SceneModel,
    last_frame_ms: Option<f64>,
    hands_in_view: usize,
    frames: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SceneModel::default(), RecognizerConfig::default(), ControllerConfig::default())
    }
}

impl Session {
    pub fn new(scene: SceneModel, recognizer: RecognizerConfig, controller: ControllerConfig) -> Self {
        Self {
            recognizer: GestureRecognizer::new(recognizer),
            controller: GestureController::new(controller),
            scene,
            last_frame_ms: None,
            hands_in_view: 0,
            frames: 0,
        }
    }

    /// Run one frame through recognizer and controller.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        let now = frame.timestamp_ms;
        if let Some(prev) = self.last_frame_ms {
            self.scene.step((now - prev).max(0.0));
        }
        self.last_frame_ms = Some(now);
        self.frames += 1;

        let sample = self.recognizer.process(frame);
        if sample.hands_detected != self.hands_in_view {
            match (self.hands_in_view, sample.hands_detected) {
                (0, n) => info!("Tracking regained: {} hand(s) at {:.1}ms", n, now),
                (_, 0) => info!("Tracking lost at {:.1}ms", now),
                (a, b) => info!("Hands in view: {} -> {}", a, b),
            }
            self.hands_in_view = sample.hands_detected;
        }

        let actions = self.controller.update(&sample, &mut self.scene);
        FrameOutcome { sample, actions }
    }

    /// Clear recognizer and controller state; the model keeps its pose.
    pub fn reset(&mut self) {
        self.recognizer.reset();
        self.controller.reset();
        self.last_frame_ms = None;
        self.hands_in_view = 0;
        info!("Gesture session reset after {} frames", self.frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let now = self.last_frame_ms.unwrap_or(0.0);
        format!(
            "(:frames {} :hands {} :recognizer {} :controller {} :model {})",
            self.frames,
            self.hands_in_view,
            self.recognizer.status_sexp(),
            self.controller.status_sexp(now),
            self.scene.status_sexp(),
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:recognizer {} :controller {})",
            self.recognizer.config_sexp(),
            self.controller.config_sexp(),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
