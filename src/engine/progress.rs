//! Progress tracking for running conversions
//!
//! The transcoder is started with `-progress pipe:1`, which makes it print
//! blocks of `key=value` lines on stdout. [`ProgressParser`] turns those
//! lines into [`ProgressUpdate`]s and [`ProgressCallback`] delivers them to
//! whoever is watching (a console reporter, a UI, a test).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called once the transcoder has been started for `input`
    fn on_start(&self, _input: &Path, _output: &Path) {}

    /// Called whenever the transcoder reports a new position
    fn on_progress(&self, input: &Path, update: &ProgressUpdate);

    /// Called when the conversion of `input` finished successfully
    fn on_complete(&self, _input: &Path, _output: &Path) {}

    /// Called when the conversion of `input` failed or was cancelled
    fn on_error(&self, _input: &Path, _error: &str) {}
}

/// Callback that ignores every event
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_progress(&self, _input: &Path, _update: &ProgressUpdate) {}
}

/// Snapshot of a conversion's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Position reached in the output, in seconds
    pub position: f64,
    /// Percentage (0-100) when the input duration is known
    pub percent: Option<u8>,
    /// Media time still to process when the input duration is known
    pub remaining: Option<Duration>,
    /// Transcoder reported `progress=end`
    pub finished: bool,
}

/// Incremental parser for the transcoder's progress stream
#[derive(Debug, Clone)]
pub struct ProgressParser {
    duration: Option<f64>,
    position: f64,
}

impl ProgressParser {
    /// Create a parser; `duration` is the input length in seconds
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            position: 0.0,
        }
    }

    /// Feed one line; returns an update when the line moved the position or
    /// ended the stream
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressUpdate> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            // Despite the name, out_time_ms is reported in microseconds
            "out_time_us" | "out_time_ms" => {
                let micros = value.parse::<f64>().ok()?;
                self.advance(micros / 1_000_000.0)
            }
            "out_time" => {
                let seconds = parse_clock(value)?;
                self.advance(seconds)
            }
            "progress" if value == "end" => {
                if let Some(duration) = self.duration {
                    self.position = self.position.max(duration);
                }
                Some(self.snapshot(true))
            }
            _ => None,
        }
    }

    /// Last position seen, in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    fn advance(&mut self, seconds: f64) -> Option<ProgressUpdate> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        self.position = seconds;
        Some(self.snapshot(false))
    }

    fn snapshot(&self, finished: bool) -> ProgressUpdate {
        let (percent, remaining) = match self.duration {
            Some(duration) => {
                let ratio = (self.position / duration).clamp(0.0, 1.0);
                let left = (duration - self.position).max(0.0);
                (Some((ratio * 100.0) as u8), Some(Duration::from_secs_f64(left)))
            }
            None => (None, None),
        };

        ProgressUpdate {
            position: self.position,
            percent,
            remaining,
            finished,
        }
    }
}

/// Parse `HH:MM:SS.micro` into seconds
fn parse_clock(value: &str) -> Option<f64> {
    let mut parts = value.split(':');
    let hours = parts.next()?.parse::<f64>().ok()?;
    let minutes = parts.next()?.parse::<f64>().ok()?;
    let seconds = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
