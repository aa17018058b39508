//! Palm-position history and velocity-windowed swipe detection.
//!
//! Swipes are judged from palm motion alone, independent of finger shape.
//! Each swipe clears the history and starts a refractory cooldown, so one
//! sweep of the hand yields exactly one event.

use std::collections::VecDeque;

use tracing::debug;

use super::recognizer::RecognizerConfig;

/// Direction of a horizontal swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A detected swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeEvent {
    pub direction: SwipeDirection,
    /// Horizontal velocity in view units per second.
    pub velocity: f32,
}

/// Palm centroid at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PalmEntry {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: f64,
}

/// Bounded, time-ordered palm history plus swipe cooldown.
#[derive(Debug, Clone, Default)]
pub struct PalmTracker {
    history: VecDeque<PalmEntry>,
    /// When the last swipe fired, if ever.
    last_swipe_ms: Option<f64>,
}

impl PalmTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the palm position for this frame.
    ///
    /// Returns the frame-to-frame delta against the previous entry, if any.
    pub fn push(&mut self, x: f32, y: f32, timestamp_ms: f64, capacity: usize) -> Option<[f32; 2]> {
        let delta = match self.history.back() {
            Some(prev) if timestamp_ms < prev.timestamp_ms => {
                debug!(
                    "Palm history: timestamp went backwards ({:.1} < {:.1}), clearing",
                    timestamp_ms, prev.timestamp_ms,
                );
                self.history.clear();
                None
            }
            Some(prev) => Some([x - prev.x, y - prev.y]),
            None => None,
        };

        self.history.push_back(PalmEntry { x, y, timestamp_ms });
        while self.history.len() > capacity.max(1) {
            self.history.pop_front();
        }
        delta
    }

    /// Check the recent window for a fast, near-horizontal sweep.
    pub fn detect_swipe(&mut self, now_ms: f64, config: &RecognizerConfig) -> Option<SwipeEvent> {
        if let Some(last) = self.last_swipe_ms {
            if now_ms - last < config.swipe_cooldown_ms {
                return None;
            }
        }

        let cutoff = now_ms - config.swipe_window_ms;
        let mut recent = self.history.iter().filter(|e| e.timestamp_ms >= cutoff);
        let first = *recent.next()?;
        let (last, count) = recent.fold((first, 1usize), |(_, n), e| (*e, n + 1));

        if count < config.swipe_min_samples {
            return None;
        }
        let span_ms = last.timestamp_ms - first.timestamp_ms;
        if span_ms < config.swipe_min_span_ms {
            return None;
        }

        let dx = last.x - first.x;
        let dy = last.y - first.y;
        let velocity = dx / (span_ms / 1000.0) as f32;

        if velocity.abs() <= config.swipe_min_velocity || dy.abs() >= config.swipe_max_slope * dx.abs() {
            return None;
        }

        let direction = if velocity > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        };

        self.history.clear();
        self.last_swipe_ms = Some(now_ms);
        debug!("Swipe detected: {:?}, velocity={:.2}", direction, velocity);
        Some(SwipeEvent { direction, velocity })
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop the palm history; the swipe cooldown survives.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Drop history and cooldown.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Tests ──────────────────────────────────────────────────
