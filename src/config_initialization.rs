//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::toml_config::{default_config_path, AppConfig};
use crate::cli::args::RunArgs;
use crate::cli::Cli;

/// Effective configuration together with where it was read from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
}

impl LoadedConfig {
    pub fn history_path(&self) -> PathBuf {
        self.config.history_path(&self.path)
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults.
///
/// Environment variables reach us through clap, so they already sit in the
/// parsed arguments with the correct priority.
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<LoadedConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);

    let mut config = AppConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    apply_global_overrides(&mut config, cli);
    if let Some(run) = cli.command.run_args() {
        apply_run_overrides(&mut config, run);
    }

    config.validate().context("Invalid configuration")?;
    Ok(LoadedConfig { config, path })
}

fn apply_global_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.as_str().to_string();
    }
    if let Some(dir) = &cli.ffmpeg_dir {
        config.tools.ffmpeg_dir = Some(dir.clone());
    }
}

/// Apply conversion options given on the command line
pub fn apply_run_overrides(config: &mut AppConfig, run: &RunArgs) {
    let mut overrides = 0;

    if let Some(dir) = &run.output_dir {
        config.conversion.output_dir = Some(dir.clone());
        overrides += 1;
    }
    if let Some(workers) = run.workers {
        config.workers.count = workers;
        config.workers.queue_capacity = config.workers.queue_capacity.max(workers);
        overrides += 1;
    }
    if run.performance {
        config.conversion.performance_mode = true;
        overrides += 1;
    }
    if run.keep_aspect_ratio {
        config.conversion.keep_aspect_ratio = true;
        overrides += 1;
    }
    if let Some(crf) = run.crf {
        config.conversion.crf = crf;
        overrides += 1;
    }
    if let Some(preset) = &run.preset {
        config.conversion.preset = preset.clone();
        overrides += 1;
    }

    if overrides > 0 {
        info!("Applied {} command-line configuration overrides", overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides_beat_file_values() {
        let mut config = AppConfig::from_toml("[conversion]\ncrf = 28\npreset = \"slow\"\n").unwrap();
        let run = RunArgs {
            crf: Some(20),
            workers: Some(3),
            performance: true,
            ..RunArgs::default()
        };

        apply_run_overrides(&mut config, &run);

        assert_eq!(config.conversion.crf, 20);
        assert_eq!(config.conversion.preset, "slow");
        assert_eq!(config.workers.count, 3);
        assert!(config.conversion.performance_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let mut config = AppConfig::from_toml("[conversion]\nperformance_mode = true\n").unwrap();
        apply_run_overrides(&mut config, &RunArgs::default());
        assert!(config.conversion.performance_mode);
    }
}
