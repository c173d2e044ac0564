//! Alert record assembly.

use crate::model::{AlertRecord, Classification, FrameMetrics};
use chrono::{DateTime, Local};

/// Rounds to two decimal places, half away from zero.
pub fn round_density(density: f64) -> f64 {
    (density * 100.0).round() / 100.0
}

/// Builds the payload handed to the alert sinks. Motion area is truncated
/// toward zero, density rounded to two places.
pub fn build_alert(
    classification: &Classification,
    metrics: &FrameMetrics,
    timestamp: DateTime<Local>,
) -> AlertRecord {
    AlertRecord {
        timestamp,
        level: classification.level,
        total_motion_area: metrics.total_motion_area.trunc() as i64,
        density: round_density(metrics.density),
        reason: classification.reason.to_string(),
    }
}
