//! Locates the external ffmpeg/ffprobe executables

use std::path::{Path, PathBuf};

use tracing::debug;

/// External tools the engine drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

/// Resolves tool executables from a configured directory, falling back to
/// the `PATH` search.
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    tool_dir: Option<PathBuf>,
}

impl ToolLocator {
    pub fn new(tool_dir: Option<PathBuf>) -> Self {
        Self { tool_dir }
    }

    pub fn tool_dir(&self) -> Option<&Path> {
        self.tool_dir.as_deref()
    }

    /// Full path of `tool`, or `None` when it cannot be found anywhere
    pub fn locate(&self, tool: Tool) -> Option<PathBuf> {
        let file_name = format!("{}{}", tool.name(), std::env::consts::EXE_SUFFIX);

        if let Some(dir) = &self.tool_dir {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                debug!("Using {} from configured directory: {}", tool.name(), candidate.display());
                return Some(candidate);
            }
            debug!(
                "{} not present in configured directory {}, searching PATH",
                tool.name(),
                dir.display()
            );
        }

        match which::which(tool.name()) {
            Ok(path) => {
                debug!("Using {} from PATH: {}", tool.name(), path.display());
                Some(path)
            }
            Err(_) => None,
        }
    }
}
