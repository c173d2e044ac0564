//! Monitor configuration loading and validation.
//!
//! All tunable values live in a TOML file (default `crowdmon.toml`). Every
//! field has a default, so a missing file or a partial file is valid. The
//! decision pipeline never reads constants of its own; it receives these
//! values through `MonitorConfig`.
//!
//! Environment overrides (read after `dotenv`):
//! - `CROWDMON_CONFIG`    — path to the TOML file
//! - `CROWDMON_ALERT_LOG` — path of the append-only alert log

use crate::logging::LogLevel;
use crate::model::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "crowdmon.toml";
pub const CONFIG_PATH_ENV: &str = "CROWDMON_CONFIG";
pub const ALERT_LOG_ENV: &str = "CROWDMON_ALERT_LOG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Motion thresholds, all in pixel² except `high_density` (a ratio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Regions at or below this area are treated as noise.
    pub min_contour_area: f64,
    pub low_motion: f64,
    pub medium_motion: f64,
    /// Frame-to-frame change in total motion area that counts as a spike.
    pub high_motion_spike: f64,
    pub high_density: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            min_contour_area: 800.0,
            low_motion: 15_000.0,
            medium_motion: 40_000.0,
            high_motion_spike: 25_000.0,
            high_density: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Consecutive non-LOW frames required before an alert may fire.
    pub temporal_frames: u32,
    /// Minimum seconds between two alerts.
    pub cooldown_seconds: f64,
    /// Append-only alert log. `None` disables the file sink.
    pub log_file: Option<String>,
    /// Ring the terminal bell on HIGH alerts.
    pub sound_enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            temporal_frames: 5,
            cooldown_seconds: 3.0,
            log_file: Some("alerts.log".to_string()),
            sound_enabled: true,
        }
    }
}

impl AlertSettings {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.cooldown_seconds * 1000.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub min_level: LogLevel,
    /// Service log (diagnostics), separate from the alert log.
    pub log_file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            log_file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub thresholds: RiskThresholds,
    pub alerts: AlertSettings,
    pub logging: LoggingSettings,
}

impl MonitorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Resolves the config the way the service starts up:
    ///
    /// 1. load `.env` if present
    /// 2. explicit `path` argument, else `CROWDMON_CONFIG`, else `crowdmon.toml`
    /// 3. a missing default file falls back to built-in defaults; a missing
    ///    explicitly named file is an error
    /// 4. `CROWDMON_ALERT_LOG` overrides the alert log path
    pub fn load_from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let explicit = path
            .map(|p| p.to_path_buf())
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(Into::into));

        let mut config = match explicit {
            Some(p) => Self::load(&p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        if let Ok(alert_log) = env::var(ALERT_LOG_ENV) {
            config.alerts.log_file = Some(alert_log);
        }

        Ok(config)
    }

    /// Rejects configurations that would make the pipeline meaningless.
    /// Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let named = [
            ("min_contour_area", t.min_contour_area),
            ("low_motion", t.low_motion),
            ("medium_motion", t.medium_motion),
            ("high_motion_spike", t.high_motion_spike),
            ("high_density", t.high_density),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.alerts.temporal_frames == 0 {
            return Err(ConfigError::ZeroTemporalFrames);
        }

        let cooldown = self.alerts.cooldown_seconds;
        if !cooldown.is_finite() || cooldown < 0.0 {
            return Err(ConfigError::InvalidCooldown(cooldown));
        }

        Ok(())
    }
}
