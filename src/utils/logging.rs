//! Logging setup and console progress reporting

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::engine::{ProgressCallback, ProgressUpdate};
use crate::utils::Utils;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// Compact text format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_target(false).try_init()?,
        LogFormat::Compact => builder.compact().try_init()?,
        LogFormat::Json => builder.json().try_init()?,
    }

    tracing::debug!("Logging initialized ({:?}, level {})", format, level);
    Ok(())
}

/// Progress reporter that logs conversion progress through `tracing`.
///
/// Progress lines are throttled to one per `step` percent per file.
pub struct ProgressReporter {
    step: u8,
    state: Mutex<HashMap<PathBuf, FileProgress>>,
}

struct FileProgress {
    started: Instant,
    last_percent: Option<u8>,
}

impl ProgressReporter {
    pub fn new(step: u8) -> Self {
        Self {
            step: step.clamp(1, 100),
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an update for `input` at `percent` should be printed
    fn should_report(&self, input: &Path, update: &ProgressUpdate) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return true;
        };
        let entry = state.entry(input.to_path_buf()).or_insert_with(|| FileProgress {
            started: Instant::now(),
            last_percent: None,
        });

        match update.percent {
            Some(percent) => {
                let due = match entry.last_percent {
                    None => true,
                    Some(last) => percent >= last.saturating_add(self.step) || (update.finished && percent > last),
                };
                if due {
                    entry.last_percent = Some(percent);
                }
                due
            }
            None => update.finished,
        }
    }

    fn take_elapsed(&self, input: &Path) -> Option<std::time::Duration> {
        self.state
            .lock()
            .ok()
            .and_then(|mut state| state.remove(input))
            .map(|progress| progress.started.elapsed())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressCallback for ProgressReporter {
    fn on_start(&self, input: &Path, output: &Path) {
        if let Ok(mut state) = self.state.lock() {
            state.insert(
                input.to_path_buf(),
                FileProgress {
                    started: Instant::now(),
                    last_percent: None,
                },
            );
        }
        tracing::info!("Started: {} -> {}", input.display(), output.display());
    }

    fn on_progress(&self, input: &Path, update: &ProgressUpdate) {
        if !self.should_report(input, update) {
            return;
        }

        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        match (update.percent, update.remaining) {
            (Some(percent), Some(remaining)) => tracing::info!(
                "[{:>3}%] {} ({} left)",
                percent,
                name,
                Utils::format_duration(remaining)
            ),
            _ => tracing::info!(
                "{} at {}",
                name,
                Utils::format_duration(std::time::Duration::from_secs_f64(update.position))
            ),
        }
    }

    fn on_complete(&self, input: &Path, output: &Path) {
        match self.take_elapsed(input) {
            Some(elapsed) => tracing::info!(
                "Completed: {} in {}",
                output.display(),
                Utils::format_duration(elapsed)
            ),
            None => tracing::info!("Completed: {}", output.display()),
        }
    }

    fn on_error(&self, input: &Path, error: &str) {
        self.take_elapsed(input);
        tracing::error!("Failed: {}: {}", input.display(), error);
    }
}
