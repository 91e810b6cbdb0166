//! Conversion engine module
//!
//! Turns planner directives into argument lists for the external transcoder
//! and interprets the progress stream it writes back.

use serde::{Deserialize, Serialize};

pub mod command;
pub mod copy;
pub mod progress;
pub mod reencode;

pub use command::CommandBuilder;
pub use progress::{NoopProgress, ProgressCallback, ProgressParser, ProgressUpdate};

/// Default constant rate factor for x264 re-encodes
pub const DEFAULT_CRF: u8 = 18;

/// Default x264 preset
pub const DEFAULT_PRESET: &str = "medium";

/// Encoding options that apply to every re-encode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CRF quality setting (0-51, lower is better)
    pub crf: u8,
    /// x264 preset used outside performance mode
    pub preset: String,
    /// Trade quality for encoding speed
    pub performance_mode: bool,
    /// Scale by height only and let the width follow the source aspect ratio
    pub keep_aspect_ratio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            performance_mode: false,
            keep_aspect_ratio: false,
        }
    }
}
