//! Crowd risk classification.
//!
//! Classification is an ordered rule table evaluated top to bottom; the
//! first rule whose predicate holds decides the level and reason. The
//! spike-plus-density rule sits first so severity wins over raw area when
//! both would match.
//!
//! Note that the tiers are driven by different signals: HIGH looks at the
//! frame-to-frame delta and density, MEDIUM and LOW at the raw total area.
//! That asymmetry is existing tuned behaviour and is kept as-is.

use crate::config::RiskThresholds;
use crate::model::{Classification, RiskLevel};

pub const REASON_PANIC: &str = "Rapid motion change with dense crowd - possible panic or stampede";
pub const REASON_SUSTAINED: &str = "Sustained high group movement - potentially unsafe situation";
pub const REASON_MINOR: &str = "Minor irregular crowd movement";
pub const REASON_NORMAL: &str = "Normal crowd behavior";

/// Signals for one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInput {
    pub total_motion_area: f64,
    /// Total motion area of the previous frame, 0 for the first frame.
    pub previous_motion_area: f64,
    pub density: f64,
}

impl ClassifierInput {
    pub fn motion_delta(&self) -> f64 {
        (self.total_motion_area - self.previous_motion_area).abs()
    }
}

/// One row of the classification table.
pub struct RiskRule {
    pub name: &'static str,
    pub level: RiskLevel,
    pub reason: &'static str,
    pub matches: fn(&ClassifierInput, &RiskThresholds) -> bool,
}

impl RiskRule {
    pub fn classification(&self) -> Classification {
        Classification {
            level: self.level,
            reason: self.reason,
        }
    }
}

fn spike_in_dense_crowd(input: &ClassifierInput, t: &RiskThresholds) -> bool {
    input.motion_delta() > t.high_motion_spike && input.density > t.high_density
}

fn sustained_group_movement(input: &ClassifierInput, t: &RiskThresholds) -> bool {
    input.total_motion_area > t.medium_motion
}

fn minor_movement(input: &ClassifierInput, t: &RiskThresholds) -> bool {
    input.total_motion_area > t.low_motion
}

fn always(_: &ClassifierInput, _: &RiskThresholds) -> bool {
    true
}

/// Rules in priority order. The last row always matches.
pub static RISK_RULES: &[RiskRule] = &[
    RiskRule {
        name: "spike_in_dense_crowd",
        level: RiskLevel::High,
        reason: REASON_PANIC,
        matches: spike_in_dense_crowd,
    },
    RiskRule {
        name: "sustained_group_movement",
        level: RiskLevel::Medium,
        reason: REASON_SUSTAINED,
        matches: sustained_group_movement,
    },
    RiskRule {
        name: "minor_movement",
        level: RiskLevel::Low,
        reason: REASON_MINOR,
        matches: minor_movement,
    },
    RiskRule {
        name: "normal",
        level: RiskLevel::Low,
        reason: REASON_NORMAL,
        matches: always,
    },
];

const NORMAL: Classification = Classification {
    level: RiskLevel::Low,
    reason: REASON_NORMAL,
};

/// Returns the first matching rule of `rules`.
pub fn first_match<'a>(
    rules: &'a [RiskRule],
    input: &ClassifierInput,
    thresholds: &RiskThresholds,
) -> Option<&'a RiskRule> {
    rules.iter().find(|rule| (rule.matches)(input, thresholds))
}

/// Classifies one frame against the built-in rule table.
pub fn classify(input: &ClassifierInput, thresholds: &RiskThresholds) -> Classification {
    first_match(RISK_RULES, input, thresholds)
        .map(RiskRule::classification)
        .unwrap_or(NORMAL)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(total: f64, previous: f64, density: f64) -> ClassifierInput {
        ClassifierInput {
            total_motion_area: total,
            previous_motion_area: previous,
            density,
        }
    }

    fn thresholds() -> RiskThresholds {
        RiskThresholds::default()
    }

    fn rule(name: &str) -> &'static RiskRule {
        RISK_RULES
            .iter()
            .find(|r| r.name == name)
            .expect("rule should exist in table")
    }

    // --- Priority -----------------------------------------------------------

    #[test]
    fn test_high_wins_over_medium_when_both_match() {
        let result = classify(&input(50_000.0, 1_000.0, 0.15), &thresholds());
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.reason, REASON_PANIC);
    }

    #[test]
    fn test_medium_when_area_high_but_no_spike() {
        // Delta is only 5 000, below the 25 000 spike threshold.
        let result = classify(&input(45_000.0, 40_000.0, 0.45), &thresholds());
        assert_eq!(result.level, RiskLevel::Medium);
        assert_eq!(result.reason, REASON_SUSTAINED);
    }

    #[test]
    fn test_spike_without_density_is_not_high() {
        // Delta of 30 000 but density 0.05 stays under 0.10.
        let result = classify(&input(30_000.0, 0.0, 0.05), &thresholds());
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.reason, REASON_MINOR);
    }

    #[test]
    fn test_falling_motion_counts_as_spike() {
        // Sudden dispersal: area drops by 35 000 while still dense.
        let result = classify(&input(20_000.0, 55_000.0, 0.2), &thresholds());
        assert_eq!(result.level, RiskLevel::High);
    }

    #[test]
    fn test_zero_motion_is_normal() {
        let result = classify(&input(0.0, 0.0, 0.0), &thresholds());
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.reason, REASON_NORMAL);
    }

    // --- Boundaries (strictly greater than) ---------------------------------

    #[test]
    fn test_area_exactly_at_medium_threshold_is_low() {
        let result = classify(&input(40_000.0, 40_000.0, 0.4), &thresholds());
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.reason, REASON_MINOR);
    }

    #[test]
    fn test_area_exactly_at_low_threshold_is_normal() {
        let result = classify(&input(15_000.0, 15_000.0, 0.15), &thresholds());
        assert_eq!(result.reason, REASON_NORMAL);
    }

    #[test]
    fn test_delta_exactly_at_spike_threshold_is_not_high() {
        let result = classify(&input(25_000.0, 0.0, 0.5), &thresholds());
        assert_eq!(result.level, RiskLevel::Low);
    }

    // --- Individual rules ---------------------------------------------------

    #[test]
    fn test_rule_table_order() {
        let names: Vec<_> = RISK_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["spike_in_dense_crowd", "sustained_group_movement", "minor_movement", "normal"]
        );
    }

    #[test]
    fn test_each_rule_predicate_in_isolation() {
        let t = thresholds();
        assert!((rule("spike_in_dense_crowd").matches)(&input(30_000.0, 0.0, 0.11), &t));
        assert!(!(rule("spike_in_dense_crowd").matches)(&input(30_000.0, 0.0, 0.10), &t));
        assert!((rule("sustained_group_movement").matches)(&input(40_001.0, 0.0, 0.0), &t));
        assert!((rule("minor_movement").matches)(&input(15_001.0, 0.0, 0.0), &t));
        assert!((rule("normal").matches)(&input(f64::MAX, 0.0, 1.0), &t));
    }

    #[test]
    fn test_last_rule_always_matches() {
        let last = RISK_RULES.last().expect("table is non-empty");
        assert!((last.matches)(&input(0.0, 0.0, 0.0), &thresholds()));
    }

    #[test]
    fn test_custom_thresholds_shift_classification() {
        let t = RiskThresholds {
            medium_motion: 10_000.0,
            ..RiskThresholds::default()
        };
        let result = classify(&input(12_000.0, 12_000.0, 0.1), &t);
        assert_eq!(result.level, RiskLevel::Medium);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let i = input(42_000.0, 10_000.0, 0.08);
        let t = thresholds();
        assert_eq!(classify(&i, &t), classify(&i, &t));
    }
}
