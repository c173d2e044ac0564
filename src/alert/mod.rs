//! Risk classification, debouncing, and cooldown-gated alert emission.
//!
//! Submodules:
//! - `classifier` — ordered rule table mapping motion signals to a risk level.
//! - `debounce`   — consecutive abnormal-frame streak.
//! - `gate`       — cooldown between alerts.
//! - `record`     — alert payload assembly.
//!
//! `step` ties the last three together into one explicit per-frame state
//! transition, so that "firing resets the streak" is part of the contract
//! rather than a side effect buried in a loop.

pub mod classifier;
pub mod debounce;
pub mod gate;
pub mod record;

use crate::model::{AlertRecord, Classification, FrameMetrics};
use chrono::{DateTime, Local};

pub use debounce::DebounceState;
pub use gate::{CooldownState, GatePolicy};

/// Outcome of one frame's transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub debounce: DebounceState,
    pub cooldown: CooldownState,
    /// `Some` exactly when the gate fired on this frame.
    pub alert: Option<AlertRecord>,
}

impl Transition {
    pub fn fired(&self) -> bool {
        self.alert.is_some()
    }
}

/// (classification, debounce, cooldown, now) → (debounce', cooldown', alert?)
///
/// The streak is updated first; if the gate then fires, the cooldown clock
/// restarts at `now` and the streak goes back to zero so the next alert
/// needs a fresh sustained run.
pub fn step(
    classification: &Classification,
    metrics: &FrameMetrics,
    debounce: DebounceState,
    cooldown: CooldownState,
    policy: &GatePolicy,
    now: DateTime<Local>,
) -> Transition {
    let debounce = debounce.observe(classification.level);

    if gate::should_fire(
        classification.level,
        debounce.abnormal_streak(),
        &cooldown,
        policy,
        now,
    ) {
        Transition {
            debounce: debounce.reset(),
            cooldown: cooldown.record_alert(now),
            alert: Some(record::build_alert(classification, metrics, now)),
        }
    } else {
        Transition {
            debounce,
            cooldown,
            alert: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::classifier::{REASON_NORMAL, REASON_SUSTAINED};
    use crate::model::RiskLevel;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    fn policy() -> GatePolicy {
        GatePolicy {
            temporal_frames: 3,
            cooldown: Duration::seconds(3),
        }
    }

    const MEDIUM: Classification = Classification {
        level: RiskLevel::Medium,
        reason: REASON_SUSTAINED,
    };

    const LOW: Classification = Classification {
        level: RiskLevel::Low,
        reason: REASON_NORMAL,
    };

    fn metrics() -> FrameMetrics {
        FrameMetrics {
            total_motion_area: 45_000.0,
            density: 0.45,
        }
    }

    #[test]
    fn test_firing_resets_streak_and_records_time() {
        let mut debounce = DebounceState::new();
        let mut cooldown = CooldownState::new();
        let mut fired_at = Vec::new();

        for i in 0..3 {
            let now = start() + Duration::milliseconds(33 * i);
            let t = step(&MEDIUM, &metrics(), debounce, cooldown, &policy(), now);
            if t.fired() {
                fired_at.push(i);
            }
            debounce = t.debounce;
            cooldown = t.cooldown;
        }

        assert_eq!(fired_at, vec![2]);
        assert_eq!(debounce.abnormal_streak(), 0);
        assert_eq!(cooldown.last_alert(), Some(start() + Duration::milliseconds(66)));
    }

    #[test]
    fn test_no_fire_leaves_cooldown_untouched() {
        let t = step(&LOW, &metrics(), DebounceState::new(), CooldownState::new(), &policy(), start());
        assert!(!t.fired());
        assert_eq!(t.cooldown, CooldownState::new());
        assert_eq!(t.debounce.abnormal_streak(), 0);
    }

    #[test]
    fn test_blocked_by_cooldown_keeps_growing_streak() {
        let cooldown = CooldownState::new().record_alert(start());
        let debounce = DebounceState::new()
            .observe(RiskLevel::Medium)
            .observe(RiskLevel::Medium)
            .observe(RiskLevel::Medium);
        let t = step(&MEDIUM, &metrics(), debounce, cooldown, &policy(), start() + Duration::seconds(1));
        assert!(!t.fired());
        assert_eq!(t.debounce.abnormal_streak(), 4);
    }

    #[test]
    fn test_alert_record_carries_frame_values() {
        let debounce = DebounceState::new()
            .observe(RiskLevel::Medium)
            .observe(RiskLevel::Medium);
        let t = step(&MEDIUM, &metrics(), debounce, CooldownState::new(), &policy(), start());
        let alert = t.alert.expect("third MEDIUM frame should fire");
        assert_eq!(alert.level, RiskLevel::Medium);
        assert_eq!(alert.total_motion_area, 45_000);
        assert_eq!(alert.density, 0.45);
        assert_eq!(alert.reason, REASON_SUSTAINED);
        assert_eq!(alert.timestamp, start());
    }
}
