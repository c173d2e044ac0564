//! Recorded-frame replay.
//!
//! Frame capture and motion extraction happen outside this crate. For
//! development and regression runs, the extractor's per-frame output can be
//! recorded as JSON lines and replayed through the pipeline:
//!
//! ```text
//! {"width": 640, "height": 480, "offset_ms": 0, "regions": [{"area": 1200.0}]}
//! {"width": 640, "height": 480, "offset_ms": 33, "regions": []}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A line that does not
//! parse is skipped with a warning; one bad frame does not end the replay.

use crate::logging::{self, Component};
use crate::model::{FrameGeometry, MotionRegion};
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub regions: Vec<MotionRegion>,
    /// Milliseconds since the start of the recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<i64>,
}

impl RecordedFrame {
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.width, self.height)
    }

    /// Capture time of this frame: the recorded offset if present, else
    /// `index × fallback_interval`. Fails when the offset does not fit in
    /// the calendar.
    pub fn timestamp(
        &self,
        started_at: DateTime<Local>,
        index: u64,
        fallback_interval: Duration,
    ) -> Result<DateTime<Local>, ReplayError> {
        let offset_ms = match self.offset_ms {
            Some(ms) => Some(ms),
            None => i64::try_from(index)
                .ok()
                .and_then(|i| fallback_interval.num_milliseconds().checked_mul(i)),
        };
        offset_ms
            .and_then(Duration::try_milliseconds)
            .and_then(|offset| started_at.checked_add_signed(offset))
            .ok_or(ReplayError::TimestampOutOfRange {
                frame: index,
                offset_ms: self.offset_ms,
            })
    }
}

#[derive(Debug)]
pub enum ReplayError {
    /// The recording could not be opened or read.
    Io(String),
    /// A line is not a valid recorded frame.
    Parse { line: usize, message: String },
    /// The frame's capture time overflows the session clock.
    TimestampOutOfRange { frame: u64, offset_ms: Option<i64> },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Io(msg) => write!(f, "Replay read error: {}", msg),
            ReplayError::Parse { line, message } => {
                write!(f, "Replay parse error on line {}: {}", line, message)
            }
            ReplayError::TimestampOutOfRange { frame, offset_ms } => match offset_ms {
                Some(ms) => write!(f, "Frame {} offset {} ms is out of range", frame, ms),
                None => write!(f, "Frame {} capture time is out of range", frame),
            },
        }
    }
}

impl std::error::Error for ReplayError {}

/// Parses one line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<RecordedFrame>, ReplayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ReplayError::Parse {
            line: line_number,
            message: e.to_string(),
        })
}

/// Iterator over the frames of a recording, in file order.
pub struct ReplaySource<R: BufRead> {
    reader: R,
    line_number: usize,
    skipped: usize,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path)
            .map_err(|e| ReplayError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            skipped: 0,
        }
    }

    /// Lines skipped because they could not be read or parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for ReplaySource<R> {
    type Item = RecordedFrame;

    fn next(&mut self) -> Option<RecordedFrame> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            self.line_number += 1;
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let parsed = String::from_utf8(std::mem::take(&mut buf))
                        .map_err(|e| ReplayError::Parse {
                            line: self.line_number,
                            message: e.to_string(),
                        })
                        .and_then(|line| parse_line(self.line_number, &line));
                    match parsed {
                        Ok(Some(frame)) => return Some(frame),
                        Ok(None) => continue,
                        Err(e) => {
                            self.skipped += 1;
                            logging::warn(Component::Replay, None, &e.to_string());
                        }
                    }
                }
                Err(e) => {
                    // The reader itself failed; nothing further can be read.
                    self.skipped += 1;
                    logging::error(
                        Component::Replay,
                        None,
                        &ReplayError::Io(e.to_string()).to_string(),
                    );
                    return None;
                }
            }
        }
    }
}
