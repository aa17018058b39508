//! Target model the controller manipulates.
//!
//! `TargetModel` is the outbound action surface: bounded rotation deltas,
//! a cyclic selection cursor, a clamped explosion amount and an idle flag.
//! `SceneModel` is a plain in-process implementation used by the replay
//! binary and tests; a renderer would supply its own.

use tracing::debug;

/// Action surface of the manipulated object.
pub trait TargetModel {
    /// Move the selection cursor by `direction` steps (cyclic).
    /// Returns the newly selected region.
    fn advance_selection(&mut self, direction: i32) -> usize;

    /// Clear selection, rotation targets and expansion.
    fn reset_view(&mut self);

    /// Add to the current rotation (radians).
    fn adjust_rotation(&mut self, delta_y: f32, delta_x: f32);

    /// Set the rotation the model eases toward on its own.
    fn set_rotation_target(&mut self, y: f32, x: f32);

    /// Current rotation as (y, x) radians.
    fn rotation(&self) -> (f32, f32);

    /// Add to the explosion amount; the model clamps to [0, 1].
    fn adjust_expansion(&mut self, delta: f32);

    fn expansion(&self) -> f32;

    fn set_idle(&mut self, idle: bool);
}

/// Idle auto-spin rate (radians per second).
const IDLE_SPIN_RATE: f32 = 0.25;
/// Fraction of the remaining distance to the target covered per 16ms.
const EASE_PER_FRAME: f32 = 0.1;

/// Reference target model: an exploded object with N selectable regions.
#[derive(Debug, Clone)]
pub struct SceneModel {
    /// Number of selectable regions.
    pub region_count: usize,
    /// Currently selected region, if any.
    pub selected: Option<usize>,
    /// Current rotation (y, x) in radians.
    pub rotation: (f32, f32),
    /// Rotation the model eases toward when nobody drives it.
    pub rotation_target: (f32, f32),
    /// Explosion amount in [0, 1].
    pub expansion: f32,
    /// Whether idle auto-spin is on.
    pub idle: bool,
}

impl SceneModel {
    pub fn new(region_count: usize) -> Self {
        Self {
            region_count: region_count.max(1),
            selected: None,
            rotation: (0.0, 0.0),
            rotation_target: (0.0, 0.0),
            expansion: 0.0,
            idle: false,
        }
    }

    /// Advance the model's own animation by `dt_ms`.
    pub fn step(&mut self, dt_ms: f64) {
        let frames = (dt_ms / 16.0) as f32;
        if self.idle {
            self.rotation_target.0 += IDLE_SPIN_RATE * (dt_ms / 1000.0) as f32;
            self.rotation_target.1 *= (1.0 - EASE_PER_FRAME).powf(frames);
        }
        let keep = (1.0 - EASE_PER_FRAME).powf(frames);
        self.rotation.0 = self.rotation_target.0 + (self.rotation.0 - self.rotation_target.0) * keep;
        self.rotation.1 = self.rotation_target.1 + (self.rotation.1 - self.rotation_target.1) * keep;
    }

    /// Expansion as a whole percentage for display.
    pub fn expansion_percent(&self) -> u32 {
        (self.expansion * 100.0).round() as u32
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:regions {} :selected {} :rotation-y {:.3} :rotation-x {:.3} :expansion {} :idle {})",
            self.region_count,
            self.selected
                .map(|s| s.to_string())
                .unwrap_or_else(|| "nil".to_string()),
            self.rotation.0,
            self.rotation.1,
            self.expansion_percent(),
            if self.idle { "t" } else { "nil" },
        )
    }
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new(8)
    }
}

impl TargetModel for SceneModel {
    fn advance_selection(&mut self, direction: i32) -> usize {
        let n = self.region_count as i64;
        let next = match self.selected {
            Some(current) => (current as i64 + direction as i64).rem_euclid(n),
            None if direction >= 0 => 0,
            None => n - 1,
        } as usize;
        self.selected = Some(next);
        debug!("Selected region {}", next);
        next
    }

    fn reset_view(&mut self) {
        self.selected = None;
        self.rotation_target = (0.0, 0.0);
        self.expansion = 0.0;
        debug!("View reset");
    }

    fn adjust_rotation(&mut self, delta_y: f32, delta_x: f32) {
        self.rotation.0 += delta_y;
        self.rotation.1 += delta_x;
    }

    fn set_rotation_target(&mut self, y: f32, x: f32) {
        self.rotation_target = (y, x);
    }

    fn rotation(&self) -> (f32, f32) {
        self.rotation
    }

    fn adjust_expansion(&mut self, delta: f32) {
        self.expansion = (self.expansion + delta).clamp(0.0, 1.0);
    }

    fn expansion(&self) -> f32 {
        self.expansion
    }

    fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }
}

// ── Tests ──────────────────────────────────────────────────
