//! MotionRegion, FrameMetrics, RiskLevel, Classification, AlertRecord
//! core data structures and error handling
//!
//! Core data types for the crowd safety monitoring service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no decision logic and no I/O, only types and their formatting.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Frame input types
// ---------------------------------------------------------------------------

/// One connected area of pixel change reported by the external motion
/// extractor, in pixel² units.
///
/// Produced fresh each frame. The aggregator treats negative or non-finite
/// areas as zero contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionRegion {
    pub area: f64,
}

impl MotionRegion {
    pub fn new(area: f64) -> Self {
        Self { area }
    }
}

/// Pixel dimensions of the monitored frame. Constant for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// width × height, as the denominator for motion density.
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// Per-frame motion signals derived from the region list.
///
/// Only `total_motion_area` outlives the frame: it becomes the "previous"
/// area for the next classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub total_motion_area: f64,
    /// total_motion_area / frame area. Normally in [0, 1]; not clamped.
    pub density: f64,
}

// ---------------------------------------------------------------------------
// Risk types
// ---------------------------------------------------------------------------

/// Crowd risk levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Anything above LOW counts toward the abnormal streak.
    pub fn is_abnormal(self) -> bool {
        self != RiskLevel::Low
    }

    /// BGR overlay colour used by display layers for the risk label.
    pub fn display_color(self) -> (u8, u8, u8) {
        match self {
            RiskLevel::Low => (0, 255, 0),
            RiskLevel::Medium => (0, 255, 255),
            RiskLevel::High => (0, 0, 255),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Result of classifying one frame. `reason` is the fixed text of the
/// rule that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: RiskLevel,
    pub reason: &'static str,
}

// ---------------------------------------------------------------------------
// Alert record
// ---------------------------------------------------------------------------

/// Structured alert payload handed to the alert sinks, once per firing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub timestamp: DateTime<Local>,
    pub level: RiskLevel,
    pub total_motion_area: i64,
    /// Rounded to two decimal places.
    pub density: f64,
    pub reason: String,
}

impl AlertRecord {
    /// The alert line shared by the console and log-file sinks:
    ///
    /// `[HH:MM:SS] RISK: <LEVEL> | MotionArea: <int> | Density: <0.00> | Reason: <reason>`
    pub fn to_line(&self) -> String {
        format!(
            "[{}] RISK: {} | MotionArea: {} | Density: {:.2} | Reason: {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.total_motion_area,
            self.density,
            self.reason
        )
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal misconfiguration. The pipeline refuses to start.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Frame width × height is zero.
    NonPositiveFrameArea { width: u32, height: u32 },
    /// A threshold is negative, NaN or infinite.
    InvalidThreshold { name: &'static str, value: f64 },
    /// The temporal frame requirement must be at least one frame.
    ZeroTemporalFrames,
    /// Alert cooldown is negative or not finite.
    InvalidCooldown(f64),
    /// The configuration file could not be read.
    Io(String),
    /// The configuration file is not valid TOML for `MonitorConfig`.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveFrameArea { width, height } => {
                write!(f, "Frame area must be positive, got {}x{}", width, height)
            }
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "Threshold '{}' must be a non-negative number, got {}", name, value)
            }
            ConfigError::ZeroTemporalFrames => write!(f, "temporal_frames must be at least 1"),
            ConfigError::InvalidCooldown(secs) => {
                write!(f, "Alert cooldown must be a non-negative number of seconds, got {}", secs)
            }
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Recoverable per-frame input problems. The offending region is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// A region reported a negative area.
    NegativeArea(f64),
    /// A region reported NaN or infinity.
    NonFiniteArea(f64),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NegativeArea(area) => write!(f, "Negative region area: {}", area),
            InputError::NonFiniteArea(area) => write!(f, "Non-finite region area: {}", area),
        }
    }
}

impl std::error::Error for InputError {}
