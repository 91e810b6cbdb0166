// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod json_history;
pub mod probe_ffprobe;
pub mod tool_locator;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use json_history::JsonHistoryStore;
pub use probe_ffprobe::FFprobeAdapter;
pub use tool_locator::{Tool, ToolLocator};
pub use toml_config::AppConfig;
