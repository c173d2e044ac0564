//! End-to-end scenarios for the frame → alert pipeline.
//!
//! Tests verify:
//! 1. Sustained abnormal runs raise exactly one alert
//! 2. A single LOW frame cancels an in-progress run
//! 3. Alerts are never closer together than the cooldown
//! 4. Severity priority and zero-motion behaviour through the full session
//!
//! All timestamps are injected; nothing here depends on the wall clock.

use chrono::{DateTime, Duration, Local, TimeZone};
use crowdmon_service::alert::classifier::{REASON_NORMAL, REASON_PANIC, REASON_SUSTAINED};
use crowdmon_service::config::MonitorConfig;
use crowdmon_service::model::{AlertRecord, FrameGeometry, MotionRegion, RiskLevel};
use crowdmon_service::session::{FrameOutcome, MonitorSession};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const FRAME_MS: i64 = 33;

fn start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
}

/// 1000 × 1000 = 1 000 000 px². 45 000 px² of motion is density 0.045,
/// well under the 0.10 HIGH density threshold.
fn geometry() -> FrameGeometry {
    FrameGeometry::new(1000, 1000)
}

fn new_session(config: &MonitorConfig) -> MonitorSession {
    MonitorSession::start(config, start()).expect("test config should be valid")
}

/// Feeds one frame per entry of `areas` (a single region each, 0 = no
/// regions) at 33 ms spacing, returning every outcome.
fn run(session: &mut MonitorSession, areas: &[f64], first_frame: i64) -> Vec<FrameOutcome> {
    areas
        .iter()
        .enumerate()
        .map(|(i, &area)| {
            let regions = if area > 0.0 { vec![MotionRegion::new(area)] } else { vec![] };
            let now = start() + Duration::milliseconds((first_frame + i as i64) * FRAME_MS);
            session
                .process_frame(&regions, geometry(), now)
                .expect("frames are valid")
        })
        .collect()
}

fn alerts(outcomes: &[FrameOutcome]) -> Vec<&AlertRecord> {
    outcomes.iter().filter_map(|o| o.alert.as_ref()).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_five_medium_frames_fire_once_on_the_fifth() {
    let mut session = new_session(&MonitorConfig::default());
    // The jump from 0 on the first frame is a spike, but density 0.045 is
    // not dense, so every frame lands on the MEDIUM rule.
    let outcomes = run(&mut session, &[45_000.0; 5], 0);

    for outcome in &outcomes {
        assert_eq!(outcome.classification.level, RiskLevel::Medium);
        assert_eq!(outcome.classification.reason, REASON_SUSTAINED);
    }

    let fired: Vec<_> = outcomes
        .iter()
        .filter(|o| o.alert.is_some())
        .map(|o| o.frame_index)
        .collect();
    assert_eq!(fired, vec![4], "only the 5th frame (index 4) should fire");
    assert_eq!(outcomes[4].abnormal_streak, 0, "streak resets right after firing");
    assert_eq!(session.abnormal_streak(), 0);

    let alert = outcomes[4].alert.as_ref().expect("fired");
    assert_eq!(alert.level, RiskLevel::Medium);
    assert_eq!(alert.total_motion_area, 45_000);
}

#[test]
fn test_single_low_frame_cancels_the_run() {
    let mut session = new_session(&MonitorConfig::default());
    let mut areas = vec![45_000.0; 4];
    areas.push(0.0);
    areas.extend([45_000.0; 4]);

    let outcomes = run(&mut session, &areas, 0);

    assert_eq!(outcomes[3].abnormal_streak, 4);
    assert_eq!(outcomes[4].classification.level, RiskLevel::Low);
    assert_eq!(outcomes[4].abnormal_streak, 0);
    assert!(alerts(&outcomes).is_empty(), "no alert may fire across the LOW frame");
    assert_eq!(session.abnormal_streak(), 4);
}

#[test]
fn test_sustained_condition_alerts_no_faster_than_cooldown() {
    let mut session = new_session(&MonitorConfig::default());
    // 10 seconds of continuous MEDIUM at ~30 fps.
    let outcomes = run(&mut session, &[45_000.0; 300], 0);
    let fired = alerts(&outcomes);

    assert!(fired.len() >= 2, "a 10 s condition should re-alert after the cooldown");
    for pair in fired.windows(2) {
        let gap = pair[1].timestamp.signed_duration_since(pair[0].timestamp);
        assert!(
            gap > Duration::seconds(3),
            "alerts {} and {} are only {:?} apart",
            pair[0],
            pair[1],
            gap
        );
    }
}

#[test]
fn test_re_alert_needs_a_fresh_streak_after_cooldown() {
    let mut config = MonitorConfig::default();
    config.alerts.cooldown_seconds = 0.1;
    let mut session = new_session(&config);

    // Frames are 33 ms apart, so the cooldown is gone after 4 frames but
    // the streak has to be rebuilt to 5 first.
    let outcomes = run(&mut session, &[45_000.0; 15], 0);
    let fired: Vec<_> = outcomes
        .iter()
        .filter(|o| o.alert.is_some())
        .map(|o| o.frame_index)
        .collect();
    assert_eq!(fired, vec![4, 9, 14]);
}

#[test]
fn test_high_outranks_medium_in_a_dense_frame() {
    let mut session = new_session(&MonitorConfig::default());
    // Previous 1 000, now 50 000 in a 333 000 px² frame → density 0.15.
    let frame = FrameGeometry::new(1000, 333);
    session
        .process_frame(&[MotionRegion::new(1_000.0)], frame, start())
        .expect("valid frame");
    let outcome = session
        .process_frame(
            &[MotionRegion::new(50_000.0)],
            frame,
            start() + Duration::milliseconds(FRAME_MS),
        )
        .expect("valid frame");

    assert_eq!(outcome.classification.level, RiskLevel::High);
    assert_eq!(outcome.classification.reason, REASON_PANIC);
}

#[test]
fn test_zero_motion_frame_is_normal() {
    let mut session = new_session(&MonitorConfig::default());
    let outcome = session
        .process_frame(&[], FrameGeometry::new(400, 250), start())
        .expect("valid frame");
    assert_eq!(outcome.metrics.total_motion_area, 0.0);
    assert_eq!(outcome.metrics.density, 0.0);
    assert_eq!(outcome.classification.level, RiskLevel::Low);
    assert_eq!(outcome.classification.reason, REASON_NORMAL);
}

#[test]
fn test_noise_regions_never_reach_the_classifier() {
    let mut session = new_session(&MonitorConfig::default());
    // 60 regions of 800 px² each: 48 000 px² of raw change, all noise.
    let regions = vec![MotionRegion::new(800.0); 60];
    for i in 0..10 {
        let outcome = session
            .process_frame(&regions, geometry(), start() + Duration::milliseconds(i * FRAME_MS))
            .expect("valid frame");
        assert_eq!(outcome.metrics.total_motion_area, 0.0);
        assert!(outcome.alert.is_none());
    }
}

#[test]
fn test_identical_sessions_produce_identical_outcomes() {
    let areas = [0.0, 20_000.0, 45_000.0, 45_000.0, 90_000.0, 10_000.0, 45_000.0];
    let mut a = new_session(&MonitorConfig::default());
    let mut b = new_session(&MonitorConfig::default());
    assert_eq!(run(&mut a, &areas, 0), run(&mut b, &areas, 0));
}
