//! Majority-vote stabilization of per-frame gesture labels.

use std::collections::VecDeque;

use super::recognizer::GestureLabel;

/// Fixed-size vote over recent raw labels.
///
/// A label becomes stable once it holds `ceil(window * ratio)` of the
/// window.  Swipes pass straight through without becoming the retained
/// label, and an active twist pose overrides anything that is not
/// high-priority.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    window: usize,
    required: usize,
    votes: VecDeque<GestureLabel>,
    stable: GestureLabel,
}

impl Stabilizer {
    pub fn new(window: usize, ratio: f32) -> Self {
        let window = window.max(1);
        let required = ((window as f32 * ratio).ceil() as usize).clamp(1, window);
        Self {
            window,
            required,
            votes: VecDeque::with_capacity(window),
            stable: GestureLabel::None,
        }
    }

    /// Votes needed for a label to take over.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Last label that won the vote (or was forced).
    pub fn stable(&self) -> GestureLabel {
        self.stable
    }

    /// Push this frame's raw label and return the label to emit.
    pub fn push(&mut self, raw: GestureLabel, twist_active: bool) -> GestureLabel {
        self.votes.push_back(raw);
        while self.votes.len() > self.window {
            self.votes.pop_front();
        }

        if raw.is_swipe() {
            return raw;
        }

        if twist_active && !raw.is_high_priority() {
            self.stable = GestureLabel::TwistPose;
            return self.stable;
        }

        if let Some((label, count)) = self.leader() {
            if count >= self.required {
                self.stable = label;
            }
        }
        self.stable
    }

    /// Most frequent label in the window; ties go to the most recent.
    fn leader(&self) -> Option<(GestureLabel, usize)> {
        let mut best: Option<(GestureLabel, usize)> = None;
        for label in self.votes.iter().rev() {
            let count = self.votes.iter().filter(|l| *l == label).count();
            if best.map_or(true, |(_, n)| count > n) {
                best = Some((*label, count));
            }
        }
        best
    }

    pub fn reset(&mut self) {
        self.votes.clear();
        self.stable = GestureLabel::None;
    }
}

// ── Tests ──────────────────────────────────────────────────
