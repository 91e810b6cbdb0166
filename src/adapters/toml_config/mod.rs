// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::AudioBitrate;
use crate::engine::{EngineConfig, DEFAULT_CRF, DEFAULT_PRESET};
use crate::error::{ConvertXError, ConvertXResult};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "CONVERTX_CONFIG";

/// Largest accepted worker count
pub const MAX_WORKERS: usize = 64;

/// Default number of entries kept per history list
pub const DEFAULT_HISTORY_ENTRIES: usize = 50;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub conversion: ConversionConfig,
    pub workers: WorkersConfig,
    pub history: HistoryConfig,
    pub logging: LoggingSection,
}

/// Location of the external tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory holding ffmpeg and ffprobe; `PATH` is searched otherwise
    pub ffmpeg_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub performance_mode: bool,
    pub keep_aspect_ratio: bool,
    pub mp3_bitrate: AudioBitrate,
    pub crf: u8,
    pub preset: String,
    /// Write outputs here instead of next to the input
    pub output_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            performance_mode: false,
            keep_aspect_ratio: false,
            mp3_bitrate: AudioBitrate::default(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    pub count: usize,
    pub queue_capacity: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let count = num_cpus::get().clamp(1, MAX_WORKERS);
        Self {
            count,
            queue_capacity: count * 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file; defaults to `history.json` beside the config file
    pub path: Option<PathBuf>,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: DEFAULT_HISTORY_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> ConvertXResult<Self> {
        if !path.exists() {
            debug!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> ConvertXResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> ConvertXResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> ConvertXResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot honour
    pub fn validate(&self) -> ConvertXResult<()> {
        if self.conversion.crf > 51 {
            return Err(invalid(format!(
                "CRF value cannot exceed 51 (got {})",
                self.conversion.crf
            )));
        }

        if self.conversion.preset.trim().is_empty() {
            return Err(invalid("Encoding preset cannot be empty".to_string()));
        }

        if !(1..=MAX_WORKERS).contains(&self.workers.count) {
            return Err(invalid(format!(
                "Worker count must be between 1 and {} (got {})",
                MAX_WORKERS, self.workers.count
            )));
        }

        if self.workers.queue_capacity == 0 {
            return Err(invalid("Queue capacity must be at least 1".to_string()));
        }

        if self.history.max_entries == 0 {
            return Err(invalid("History must keep at least one entry".to_string()));
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => {
                return Err(invalid(format!(
                    "Unknown log format '{}' (expected pretty, compact or json)",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Encoder settings for the command builder
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            crf: self.conversion.crf,
            preset: self.conversion.preset.clone(),
            performance_mode: self.conversion.performance_mode,
            keep_aspect_ratio: self.conversion.keep_aspect_ratio,
        }
    }

    /// History file, defaulting to a sibling of the configuration file
    pub fn history_path(&self, config_path: &Path) -> PathBuf {
        match &self.history.path {
            Some(path) => path.clone(),
            None => config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("history.json"),
        }
    }
}

/// Default configuration file location.
///
/// `$CONVERTX_CONFIG` wins; otherwise the platform config directory
/// (`APPDATA`, `XDG_CONFIG_HOME`, `~/.config`), else the working directory.
pub fn default_config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(explicit);
    }

    let base = std::env::var_os("APPDATA")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("XDG_CONFIG_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        });

    match base {
        Some(dir) => dir.join("convertx").join("config.toml"),
        None => PathBuf::from("convertx.toml"),
    }
}

fn invalid(message: String) -> ConvertXError {
    ConvertXError::InvalidConfig { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [conversion]
            performance_mode = true
            mp3_bitrate = 256

            [tools]
            ffmpeg_dir = "/opt/ffmpeg/bin"
            "#,
        )
        .unwrap();

        assert!(config.conversion.performance_mode);
        assert_eq!(config.conversion.mp3_bitrate, AudioBitrate::Kbps256);
        assert_eq!(config.conversion.crf, DEFAULT_CRF);
        assert_eq!(config.tools.ffmpeg_dir, Some(PathBuf::from("/opt/ffmpeg/bin")));
        assert_eq!(config.history.max_entries, DEFAULT_HISTORY_ENTRIES);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            AppConfig::from_toml("[conversion]\ncrf = 60\n"),
            Err(ConvertXError::InvalidConfig { .. })
        ));
        assert!(AppConfig::from_toml("[workers]\ncount = 0\n").is_err());
        assert!(AppConfig::from_toml("[workers]\ncount = 65\n").is_err());
        assert!(AppConfig::from_toml("[logging]\nformat = \"xml\"\n").is_err());
        // Only 320/256/128 kbps are offered
        assert!(matches!(
            AppConfig::from_toml("[conversion]\nmp3_bitrate = 192\n"),
            Err(ConvertXError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.conversion.keep_aspect_ratio = true;
        config.conversion.output_dir = Some(dir.path().join("out"));
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_engine_config_mapping() {
        let mut config = AppConfig::default();
        config.conversion.crf = 23;
        config.conversion.preset = "slow".to_string();
        config.conversion.performance_mode = true;

        let engine = config.engine_config();
        assert_eq!(engine.crf, 23);
        assert_eq!(engine.preset, "slow");
        assert!(engine.performance_mode);
        assert!(!engine.keep_aspect_ratio);
    }

    #[test]
    fn test_history_path_defaults_next_to_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.history_path(Path::new("/etc/convertx/config.toml")),
            PathBuf::from("/etc/convertx/history.json")
        );
    }
}
