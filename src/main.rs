//! ConvertX media converter
//!
//! A command-line tool that converts media files between containers, picking
//! a lossless stream copy when the resolution and codecs allow it and a
//! re-encode (Lanczos when upscaling) when they do not.
//!
//! # Usage
//!
//! ```bash
//! convertx probe "clip.mp4"
//! convertx plan "clip.mp4" --format mkv --resolution 4k
//! convertx convert "a.mp4" "b.mov" --format mp4 --resolution 1080p
//! convertx batch ~/Downloads --format mp3 --bitrate 256
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use convertx_cli::app::DefaultAppContainer;
use convertx_cli::cli::{commands, Cli, Commands};
use convertx_cli::config_initialization::initialize_configuration_hierarchy;
use convertx_cli::utils::logging::{init_logging, LogFormat};

/// Main entry point for the ConvertX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli)?;
    let log_format: LogFormat = loaded
        .config
        .logging
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(&loaded.config.logging.level, log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting ConvertX {}", env!("CARGO_PKG_VERSION"));

    // Configuration commands never touch the history or the external tools
    if let Commands::Config(args) = cli.command {
        return commands::config(&loaded, args);
    }

    let container = DefaultAppContainer::new(loaded.config.clone(), loaded.history_path())
        .await
        .context("Failed to initialize application")?;

    match cli.command {
        Commands::Probe(args) => commands::probe(&container, args).await,
        Commands::Plan(args) => commands::plan(&container, args).await,
        Commands::Convert(args) => commands::convert(&container, args).await,
        Commands::Batch(args) => commands::batch(&container, args).await,
        Commands::Recent(args) => commands::recent(&container, args).await,
        Commands::Config(args) => commands::config(&loaded, args),
    }
}
