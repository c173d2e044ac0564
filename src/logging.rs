//! Structured logging for the crowd monitoring service
//!
//! Provides context-rich logging with component tags, frame indices,
//! timestamps, and severity levels. Supports both console output
//! and file-based logging for unattended runs.
//!
//! This is the service's diagnostic log. Alert lines go to the alert
//! sinks (`sinks` module), not through here.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Config,
    Metrics,
    Classifier,
    Gate,
    Sink,
    Replay,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Config => write!(f, "CFG"),
            Component::Metrics => write!(f, "METRICS"),
            Component::Classifier => write!(f, "RISK"),
            Component::Gate => write!(f, "GATE"),
            Component::Sink => write!(f, "SINK"),
            Component::Replay => write!(f, "REPLAY"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. no audio device on a headless host
    Expected,
    /// Unexpected failure - indicates a deployment or filesystem problem
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance. Diagnostics only; no pipeline state lives here.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: Component, frame: Option<u64>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, frame, message);
        let timestamped = self.console_timestamps.then_some(log_entry.as_str());
        let line = console_line(level, component, frame, message, timestamped);
        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            LogLevel::Info | LogLevel::Debug => println!("{}", line),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = append_line(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }
}

/// `2024-05-01 13:00:00 WARN METRICS [frame 12]: message`
fn format_entry(level: LogLevel, component: Component, frame: Option<u64>, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let frame_part = frame.map(|n| format!(" [frame {}]", n)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, frame_part, message)
}

/// Console rendering of one entry. `timestamped` is the full file entry
/// when console timestamps are on; otherwise a compact tagged line is used.
fn console_line(
    level: LogLevel,
    component: Component,
    frame: Option<u64>,
    message: &str,
    timestamped: Option<&str>,
) -> String {
    let frame_part = frame.map(|n| format!(" [frame {}]", n)).unwrap_or_default();
    match (timestamped, level) {
        (Some(entry), LogLevel::Error) => entry.to_string(),
        (Some(entry), LogLevel::Warning) => format!("   {}", entry),
        (_, LogLevel::Info) => format!("   {}", message),
        (_, LogLevel::Debug) => format!("   [DEBUG] {}{}: {}", component, frame_part, message),
        (None, LogLevel::Error) => format!("   ✗ {}{}: {}", component, frame_part, message),
        (None, LogLevel::Warning) => format!("   ⚠ {}{}: {}", component, frame_part, message),
    }
}

/// Appends one line to `path`, creating the file if needed.
pub(crate) fn append_line(path: &str, entry: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", entry)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, frame: Option<u64>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, frame, message);
        }
    }
}

pub fn info(component: Component, frame: Option<u64>, message: &str) {
    dispatch(LogLevel::Info, component, frame, message);
}

pub fn warn(component: Component, frame: Option<u64>, message: &str) {
    dispatch(LogLevel::Warning, component, frame, message);
}

pub fn error(component: Component, frame: Option<u64>, message: &str) {
    dispatch(LogLevel::Error, component, frame, message);
}

pub fn debug(component: Component, frame: Option<u64>, message: &str) {
    dispatch(LogLevel::Debug, component, frame, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an alert sink failure from its error text.
pub fn classify_sink_failure(sink_name: &str, error_message: &str) -> FailureType {
    if sink_name == "sound" || error_message.contains("device") {
        // Headless hosts have no audio output; losing the bell is tolerable.
        FailureType::Expected
    } else if error_message.contains("permission denied")
        || error_message.contains("Permission denied")
        || error_message.contains("No such file or directory")
    {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

/// Log an alert sink failure with automatic classification.
pub fn log_sink_failure(sink_name: &str, frame: Option<u64>, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_sink_failure(sink_name, &error_msg);

    let message = format!("{} sink failed [{}]: {}", sink_name, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Component::Sink, frame, &message),
        FailureType::Unexpected => error(Component::Sink, frame, &message),
        FailureType::Unknown => warn(Component::Sink, frame, &message),
    }
}

// ---------------------------------------------------------------------------
// Session Summary Logging
// ---------------------------------------------------------------------------

/// Log the end-of-run summary. Skipped regions or sink failures raise the
/// summary to a warning.
pub fn log_session_summary(
    frames: u64,
    alerts: u64,
    average_fps: f64,
    rejected_regions: u64,
    sink_failures: u64,
) {
    let message = format!(
        "Monitoring stopped: {} frames, {} alerts, average FPS {:.2}",
        frames, alerts, average_fps
    );

    if rejected_regions == 0 && sink_failures == 0 {
        info(Component::System, None, &message);
    } else {
        warn(
            Component::System,
            None,
            &format!(
                "{} ({} malformed regions skipped, {} sink failures)",
                message, rejected_regions, sink_failures
            ),
        );
    }
}
