//! Per-session processing state for the crowd monitoring pipeline.
//!
//! A `MonitorSession` owns the three values carried from frame to frame
//! (previous motion area, abnormal streak, last alert time) and runs the
//! whole pipeline for one frame in `process_frame`:
//!
//!   regions → aggregate → classify → debounce → gate → alert record
//!
//! Frames must be fed in arrival order: each classification depends on the
//! previous frame's motion area. The session is owned by a single loop and
//! is never shared, so there is no locking. Stopping between any two
//! `process_frame` calls leaves it consistent.

use crate::alert::classifier::{self, ClassifierInput};
use crate::alert::{self, CooldownState, DebounceState, GatePolicy};
use crate::analysis::motion;
use crate::config::{MonitorConfig, RiskThresholds};
use crate::logging::{self, Component};
use crate::model::{
    AlertRecord, Classification, ConfigError, FrameGeometry, FrameMetrics, MotionRegion, RiskLevel,
};
use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// Outcome and statistics
// ---------------------------------------------------------------------------

/// Everything the caller needs after one frame: the risk label for the
/// display layer and, when the gate fired, the alert for the sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub metrics: FrameMetrics,
    pub classification: Classification,
    /// Streak after this frame, already reset if the alert fired.
    pub abnormal_streak: u32,
    pub alert: Option<AlertRecord>,
    pub rejected_regions: usize,
}

impl FrameOutcome {
    /// The "Risk: LEVEL" label and its BGR colour, as drawn on the frame.
    pub fn risk_banner(&self) -> (String, (u8, u8, u8)) {
        let level = self.classification.level;
        (format!("Risk: {}", level), level.display_color())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub started_at: DateTime<Local>,
    pub frames: u64,
    pub alerts: u64,
    pub rejected_regions: u64,
    /// Frames per level, indexed LOW, MEDIUM, HIGH.
    pub frames_by_level: [u64; 3],
}

impl SessionStats {
    fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            frames: 0,
            alerts: 0,
            rejected_regions: 0,
            frames_by_level: [0; 3],
        }
    }

    pub fn frames_at(&self, level: RiskLevel) -> u64 {
        self.frames_by_level[level_index(level)]
    }

    /// Frames processed per second of elapsed session time. Zero until
    /// some time has passed.
    pub fn average_fps(&self, now: DateTime<Local>) -> f64 {
        let elapsed_ms = now.signed_duration_since(self.started_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0.0;
        }
        self.frames as f64 / (elapsed_ms as f64 / 1000.0)
    }
}

fn level_index(level: RiskLevel) -> usize {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MonitorSession {
    thresholds: RiskThresholds,
    policy: GatePolicy,
    previous_motion_area: f64,
    debounce: DebounceState,
    cooldown: CooldownState,
    stats: SessionStats,
}

impl MonitorSession {
    /// Validates `config` and opens a session. An invalid configuration
    /// stops the pipeline here instead of being clamped.
    pub fn start(config: &MonitorConfig, started_at: DateTime<Local>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            thresholds: config.thresholds.clone(),
            policy: GatePolicy {
                temporal_frames: config.alerts.temporal_frames,
                cooldown: config.alerts.cooldown(),
            },
            previous_motion_area: 0.0,
            debounce: DebounceState::new(),
            cooldown: CooldownState::new(),
            stats: SessionStats::new(started_at),
        })
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn abnormal_streak(&self) -> u32 {
        self.debounce.abnormal_streak()
    }

    pub fn previous_motion_area(&self) -> f64 {
        self.previous_motion_area
    }

    pub fn last_alert(&self) -> Option<DateTime<Local>> {
        self.cooldown.last_alert()
    }

    /// Runs one frame through the pipeline.
    ///
    /// Malformed regions are skipped with a warning. A frame without area is
    /// a configuration error and leaves the session unchanged.
    pub fn process_frame(
        &mut self,
        regions: &[MotionRegion],
        geometry: FrameGeometry,
        now: DateTime<Local>,
    ) -> Result<FrameOutcome, ConfigError> {
        let frame_index = self.stats.frames;
        let summary = motion::aggregate(regions, geometry, self.thresholds.min_contour_area)?;

        for rejected in &summary.rejected {
            logging::warn(
                Component::Metrics,
                Some(frame_index),
                &format!("skipping region: {}", rejected),
            );
        }

        let metrics = summary.metrics;
        let classification = classifier::classify(
            &ClassifierInput {
                total_motion_area: metrics.total_motion_area,
                previous_motion_area: self.previous_motion_area,
                density: metrics.density,
            },
            &self.thresholds,
        );

        let transition = alert::step(
            &classification,
            &metrics,
            self.debounce,
            self.cooldown,
            &self.policy,
            now,
        );

        self.debounce = transition.debounce;
        self.cooldown = transition.cooldown;
        self.previous_motion_area = metrics.total_motion_area;

        self.stats.frames += 1;
        self.stats.frames_by_level[level_index(classification.level)] += 1;
        self.stats.rejected_regions += summary.rejected.len() as u64;

        if transition.alert.is_some() {
            self.stats.alerts += 1;
            logging::debug(
                Component::Gate,
                Some(frame_index),
                &format!("{} alert fired, streak reset", classification.level),
            );
        } else {
            logging::debug(
                Component::Classifier,
                Some(frame_index),
                &format!(
                    "{} area={:.0} density={:.3} streak={}",
                    classification.level,
                    metrics.total_motion_area,
                    metrics.density,
                    self.debounce.abnormal_streak()
                ),
            );
        }

        Ok(FrameOutcome {
            frame_index,
            metrics,
            classification,
            abnormal_streak: self.debounce.abnormal_streak(),
            alert: transition.alert,
            rejected_regions: summary.rejected.len(),
        })
    }
}
