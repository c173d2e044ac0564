//! Alert sinks: console, append-only alert log, and audible signal.
//!
//! The pipeline hands each fired `AlertRecord` to an `AlertDispatcher`,
//! which forwards it to every configured sink. A failing sink is logged and
//! counted; it never stops delivery to the other sinks and never reaches
//! the frame loop as an error.

use crate::config::AlertSettings;
use crate::logging;
use crate::model::{AlertRecord, RiskLevel};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SinkError {
    /// Writing the alert failed.
    Io { sink: &'static str, source: io::Error },
    /// The sink has no device to deliver to.
    Unavailable { sink: &'static str, reason: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io { sink, source } => write!(f, "{} write failed: {}", sink, source),
            SinkError::Unavailable { sink, reason } => {
                write!(f, "{} device unavailable: {}", sink, reason)
            }
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io { source, .. } => Some(source),
            SinkError::Unavailable { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

pub trait AlertSink {
    fn name(&self) -> &'static str;

    /// Delivers one alert. Called once per firing.
    fn deliver(&mut self, record: &AlertRecord) -> Result<(), SinkError>;
}

/// Writes the alert line to a text stream (stdout in production).
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AlertSink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver(&mut self, record: &AlertRecord) -> Result<(), SinkError> {
        writeln!(self.out, "{}", record.to_line())
            .and_then(|_| self.out.flush())
            .map_err(|source| SinkError::Io { sink: "console", source })
    }
}

/// Appends the alert line to a file, creating it on first use.
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AlertSink for FileLogSink {
    fn name(&self) -> &'static str {
        "logfile"
    }

    fn deliver(&mut self, record: &AlertRecord) -> Result<(), SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SinkError::Io { sink: "logfile", source })?;
        writeln!(file, "{}", record.to_line()).map_err(|source| SinkError::Io { sink: "logfile", source })
    }
}

/// Audible alert for HIGH risk only. Rings the terminal bell on the given
/// stream; tone and duration are up to the terminal.
pub struct SoundSink<W: Write> {
    out: W,
}

impl SoundSink<io::Stderr> {
    pub fn terminal_bell() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> SoundSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AlertSink for SoundSink<W> {
    fn name(&self) -> &'static str {
        "sound"
    }

    fn deliver(&mut self, record: &AlertRecord) -> Result<(), SinkError> {
        if record.level != RiskLevel::High {
            return Ok(());
        }
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|e| SinkError::Unavailable {
                sink: "sound",
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AlertDispatcher {
    sinks: Vec<Box<dyn AlertSink>>,
    failures: u64,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console, alert log (if configured) and sound (if enabled).
    pub fn from_settings(settings: &AlertSettings) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.add(Box::new(ConsoleSink::stdout()));
        if let Some(path) = &settings.log_file {
            dispatcher.add(Box::new(FileLogSink::new(path)));
        }
        if settings.sound_enabled {
            dispatcher.add(Box::new(SoundSink::terminal_bell()));
        }
        dispatcher
    }

    pub fn add(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Total sink failures since creation.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Hands `record` to every sink and returns how many accepted it.
    pub fn dispatch(&mut self, record: &AlertRecord, frame: Option<u64>) -> usize {
        let mut delivered = 0;
        for sink in self.sinks.iter_mut() {
            match sink.deliver(record) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    self.failures += 1;
                    logging::log_sink_failure(sink.name(), frame, &e);
                }
            }
        }
        delivered
    }
}
