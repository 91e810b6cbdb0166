//! CLI module for ConvertX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// ConvertX media converter
///
/// Converts media files between containers, stream-copying when the
/// resolution and codecs allow it and re-encoding (Lanczos when upscaling)
/// when they do not.
#[derive(Parser, Debug)]
#[command(name = "convertx")]
#[command(about = "ConvertX - resolution-aware media conversion")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, env = "CONVERTX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, env = "CONVERTX_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, env = "CONVERTX_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Directory containing the ffmpeg and ffprobe executables
    #[arg(long, env = "CONVERTX_FFMPEG_DIR", global = true)]
    pub ffmpeg_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a media file's resolution and container
    Probe(args::ProbeArgs),
    /// Preview a conversion without running it
    Plan(args::PlanArgs),
    /// Convert one or more files
    Convert(args::ConvertArgs),
    /// Convert every media file in a directory
    Batch(args::BatchArgs),
    /// Manage recent downloads and converted files
    Recent(args::RecentArgs),
    /// Show or create the configuration file
    Config(args::ConfigArgs),
}

impl Commands {
    /// Conversion options given on the command line, if the command has any
    pub fn run_args(&self) -> Option<&args::RunArgs> {
        match self {
            Commands::Plan(args) => Some(&args.run),
            Commands::Convert(args) => Some(&args.run),
            Commands::Batch(args) => Some(&args.run),
            _ => None,
        }
    }
}
