//! Alert cooldown gating.
//!
//! A sustained abnormal condition should produce one alert, not one per
//! frame. The gate fires only when the frame is non-LOW, the debounced
//! streak is long enough, and the cooldown since the last alert has passed.
//!
//! # Clock injection
//! Every function takes `now` rather than calling `Local::now()`, so the
//! gate is deterministic in tests without mocking time.

use crate::model::RiskLevel;
use chrono::{DateTime, Duration, Local};

/// Gate parameters, taken from `AlertSettings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    /// Consecutive non-LOW frames required.
    pub temporal_frames: u32,
    pub cooldown: Duration,
}

/// Time of the last emitted alert. `None` behaves as the distant past.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CooldownState {
    last_alert: Option<DateTime<Local>>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_alert(&self) -> Option<DateTime<Local>> {
        self.last_alert
    }

    /// Returns `true` once strictly more than `cooldown` has elapsed:
    ///   elapsed >  cooldown → expired
    ///   elapsed == cooldown → still cooling down
    pub fn has_expired_at(&self, cooldown: Duration, now: DateTime<Local>) -> bool {
        match self.last_alert {
            None => true,
            Some(last) => now.signed_duration_since(last) > cooldown,
        }
    }

    pub fn record_alert(self, now: DateTime<Local>) -> Self {
        Self {
            last_alert: Some(now),
        }
    }
}

/// The firing predicate.
pub fn should_fire(
    level: RiskLevel,
    abnormal_streak: u32,
    cooldown: &CooldownState,
    policy: &GatePolicy,
    now: DateTime<Local>,
) -> bool {
    level.is_abnormal()
        && abnormal_streak >= policy.temporal_frames
        && cooldown.has_expired_at(policy.cooldown, now)
}
