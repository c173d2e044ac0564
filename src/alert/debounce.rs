//! Temporal debouncing of risk classifications.
//!
//! A single noisy frame must not raise an alert, so the gate asks for a run
//! of consecutive non-LOW frames. One LOW frame cancels the run outright.

use crate::model::RiskLevel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceState {
    abnormal_streak: u32,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abnormal_streak(&self) -> u32 {
        self.abnormal_streak
    }

    /// Applies one frame's level: non-LOW extends the streak, LOW zeroes it.
    pub fn observe(self, level: RiskLevel) -> Self {
        let abnormal_streak = if level.is_abnormal() {
            self.abnormal_streak.saturating_add(1)
        } else {
            0
        };
        Self { abnormal_streak }
    }

    pub fn is_sustained(&self, threshold: u32) -> bool {
        self.abnormal_streak >= threshold
    }

    pub fn reset(self) -> Self {
        Self::default()
    }
}
