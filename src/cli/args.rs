//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};
use clap_num::number_range;

use crate::adapters::toml_config::MAX_WORKERS;
use crate::domain::model::{AudioBitrate, ContainerFormat, ResolutionTarget};

fn parse_workers(s: &str) -> Result<usize, String> {
    number_range(s, 1, MAX_WORKERS)
}

fn parse_crf(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

fn parse_bitrate(s: &str) -> Result<AudioBitrate, String> {
    let kbps: u32 = s
        .trim()
        .trim_end_matches("kbps")
        .trim_end_matches('k')
        .parse()
        .map_err(|_| format!("'{}' is not a bitrate", s))?;
    AudioBitrate::try_from(kbps).map_err(|e| e.to_string())
}

/// What to convert into
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Output format (mp4, avi, mkv, webm, mov, mp3, wav, aiff, flac)
    #[arg(short, long)]
    pub format: ContainerFormat,

    /// Target resolution for video outputs (1080p, 2k, 4k)
    #[arg(short, long)]
    pub resolution: Option<ResolutionTarget>,

    /// MP3 bitrate in kbps (320, 256, 128)
    #[arg(short, long, value_parser = parse_bitrate)]
    pub bitrate: Option<AudioBitrate>,
}

/// Options shared by commands that run conversions
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Write outputs to this directory instead of next to each input
    #[arg(short, long, env = "CONVERTX_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of parallel conversions (1-64)
    #[arg(short, long, env = "CONVERTX_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Trade quality for encoding speed
    #[arg(long, env = "CONVERTX_PERFORMANCE_MODE")]
    pub performance: bool,

    /// Scale by height and keep the source aspect ratio
    #[arg(long, env = "CONVERTX_KEEP_ASPECT_RATIO")]
    pub keep_aspect_ratio: bool,

    /// Constant Rate Factor for x264 (0-51)
    #[arg(long, env = "CONVERTX_CRF", value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// x264 encoding preset
    #[arg(long, env = "CONVERTX_PRESET")]
    pub preset: Option<String>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Media file to plan a conversion for
    pub file: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Media files to convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory to scan for media files
    pub dir: PathBuf,

    /// Descend into subdirectories
    #[arg(long)]
    pub recursive: bool,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the recent command
#[derive(Args, Debug)]
pub struct RecentArgs {
    #[command(subcommand)]
    pub action: RecentAction,
}

#[derive(Subcommand, Debug)]
pub enum RecentAction {
    /// Show recent downloads and converted files
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Register a downloaded file
    Import {
        /// Completed download
        path: PathBuf,
    },
    /// Forget recent downloads (or converted files with --converted)
    Clear {
        #[arg(long)]
        converted: bool,
    },
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
