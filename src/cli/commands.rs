//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::adapters::toml_config::AppConfig;
use crate::app::{AppContainer, ConversionOutcome, ConversionPreview, DefaultAppContainer, JobHandle, WorkerPool};
use crate::cli::args::{
    BatchArgs, ConfigAction, ConfigArgs, ConvertArgs, PlanArgs, ProbeArgs, RecentAction, RecentArgs, TargetArgs,
};
use crate::config_initialization::LoadedConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{ContainerFormat, ConversionRequest, MediaDescriptor, ResolutionTarget};
use crate::domain::rules::ScaleDecision;
use crate::planner::ConversionPlanner;
use crate::utils::logging::ProgressReporter;
use crate::utils::Utils;

/// Per-resolution action offered for a probed video
#[derive(Debug, Serialize)]
struct ResolutionAction {
    resolution: &'static str,
    decision: ScaleDecision,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    #[serde(flatten)]
    media: MediaDescriptor,
    size_bytes: Option<u64>,
    actions: Vec<ResolutionAction>,
}

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    #[serde(flatten)]
    preview: &'a ConversionPreview,
    command: Vec<String>,
}

/// Execute the probe command
pub async fn probe(container: &DefaultAppContainer, args: ProbeArgs) -> Result<()> {
    let media = container
        .convert_interactor()
        .inspect(&args.file)
        .await
        .with_context(|| format!("Failed to probe {}", args.file.display()))?;

    let size_bytes = tokio::fs::metadata(&args.file).await.ok().map(|meta| meta.len());
    let report = ProbeReport {
        actions: resolution_actions(&media),
        media,
        size_bytes,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize media info to JSON")?;
        println!("{}", json);
    } else {
        display_probe_report(&report);
    }
    Ok(())
}

/// Same-container conversion to every canonical resolution, as offered in
/// a file's context menu
fn resolution_actions(media: &MediaDescriptor) -> Vec<ResolutionAction> {
    if !media.has_video {
        return Vec::new();
    }

    let planner = ConversionPlanner::new();
    ResolutionTarget::ALL
        .iter()
        .filter_map(|target| {
            let directive = planner
                .plan_directive(media, Some(*target), media.container)
                .ok()?;
            let decision = ScaleDecision::classify(media.dimensions(), &directive);
            Some(ResolutionAction {
                resolution: target.label(),
                decision,
                label: decision.action_label(),
            })
        })
        .collect()
}

fn display_probe_report(report: &ProbeReport) {
    let media = &report.media;
    println!("File:       {}", media.path.display());
    println!("Container:  {}", media.container);
    if media.has_video {
        println!("Resolution: {}", media.dimensions());
    }
    if let Some(duration) = media.duration {
        println!(
            "Duration:   {}",
            Utils::format_duration(std::time::Duration::from_secs_f64(duration))
        );
    }
    if let Some(size) = report.size_bytes {
        println!("Size:       {}", Utils::format_file_size(size));
    }
    for action in &report.actions {
        println!("  {:<6} {}", action.resolution, action.label);
    }
}

/// Execute the plan command
pub async fn plan(container: &DefaultAppContainer, args: PlanArgs) -> Result<()> {
    let request = build_request(&args.target, container.config())?;
    let interactor = container.convert_interactor();

    let preview = interactor
        .preview(&args.file, &request)
        .await
        .with_context(|| format!("Failed to plan conversion of {}", args.file.display()))?;
    let command = interactor
        .command_line(&args.file, &preview)
        .context("Failed to build transcoder command")?;

    if args.json {
        let report = PlanReport {
            preview: &preview,
            command,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Source:    {} ({}, {})", args.file.display(), preview.source.container, preview.source.dimensions());
    println!("Operation: {}", preview.directive);
    println!("Scaling:   {}", preview.decision.description());
    println!("Action:    {}", preview.decision.action_label());
    println!("Output:    {}", preview.output_path.display());
    println!("Command:   ffmpeg {}", command.join(" "));
    Ok(())
}

/// Execute the convert command
pub async fn convert(container: &DefaultAppContainer, args: ConvertArgs) -> Result<()> {
    let request = build_request(&args.target, container.config())?;
    run_conversions(container, args.files, request).await
}

/// Execute the batch command
pub async fn batch(container: &DefaultAppContainer, args: BatchArgs) -> Result<()> {
    let request = build_request(&args.target, container.config())?;
    let files = scan_directory(&args.dir, args.recursive)?;

    if files.is_empty() {
        warn!("No supported media files found in {}", args.dir.display());
        return Ok(());
    }

    info!("Found {} media files in {}", files.len(), args.dir.display());
    run_conversions(container, files, request).await
}

/// Execute the recent command
pub async fn recent(container: &DefaultAppContainer, args: RecentArgs) -> Result<()> {
    let history = container.history();

    match args.action {
        RecentAction::List { json } => {
            let entries = history.load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            println!("Recent downloads:");
            for entry in &entries.recent_downloads {
                println!("  {}  {}", entry.recorded_at.format("%Y-%m-%d %H:%M"), entry.path.display());
            }
            println!("Converted files:");
            for entry in &entries.converted_files {
                println!("  {}  {}", entry.recorded_at.format("%Y-%m-%d %H:%M"), entry.path.display());
            }
        }
        RecentAction::Import { path } => {
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            let path = tokio::fs::canonicalize(&path).await.unwrap_or(path);
            history.record_download(&path).await?;
            println!("Imported {}", path.display());
        }
        RecentAction::Clear { converted } => {
            if converted {
                history.clear_conversions().await?;
                println!("Cleared converted files");
            } else {
                history.clear_downloads().await?;
                println!("Cleared recent downloads");
            }
        }
    }
    Ok(())
}

/// Execute the config command
pub fn config(loaded: &LoadedConfig, args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("# {}", loaded.path.display());
            print!("{}", loaded.config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            if loaded.path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {} (use --force to overwrite)",
                    loaded.path.display()
                );
            }
            AppConfig::default()
                .save(&loaded.path)
                .with_context(|| format!("Failed to write {}", loaded.path.display()))?;
            println!("Wrote {}", loaded.path.display());
        }
    }
    Ok(())
}

fn build_request(target: &TargetArgs, config: &AppConfig) -> Result<ConversionRequest> {
    let bitrate = target.bitrate.unwrap_or(config.conversion.mp3_bitrate);
    ConversionRequest::new(target.format, target.resolution, bitrate).context("Invalid conversion request")
}

/// Supported media files directly in `dir` (or below it when `recursive`)
fn scan_directory(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut walker = WalkDir::new(dir).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| ContainerFormat::from_path(path).is_some())
        .collect();
    files.sort();
    Ok(files)
}

/// Push every file through the worker pool and report per-file results
async fn run_conversions(container: &DefaultAppContainer, files: Vec<PathBuf>, request: ConversionRequest) -> Result<()> {
    let total = files.len();
    let pool = container.worker_pool(Arc::new(ProgressReporter::default()));
    info!(
        "Converting {} file(s) to {} with {} worker(s)",
        total,
        request.output_format,
        pool.worker_count()
    );

    let results = {
        let work = submit_and_wait(&pool, files, &request);
        tokio::pin!(work);
        tokio::select! {
            results = &mut work => results,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling conversions");
                pool.cancel_all();
                work.await
            }
        }
    };
    pool.shutdown().await;

    let mut failed = 0;
    for (input, result) in results {
        match result {
            Ok(outcome) => println!(
                "{} -> {} ({})",
                input.display(),
                outcome.output.display(),
                outcome.decision.description()
            ),
            Err(e) => {
                failed += 1;
                if e.is_cancelled() {
                    warn!("Cancelled: {}", input.display());
                } else {
                    error!("Failed to convert {}: {}", input.display(), e);
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} conversion(s) failed", failed, total);
    }
    info!("All {} conversion(s) completed", total);
    Ok(())
}

async fn submit_and_wait(
    pool: &WorkerPool,
    files: Vec<PathBuf>,
    request: &ConversionRequest,
) -> Vec<(PathBuf, Result<ConversionOutcome, DomainError>)> {
    let mut handles: Vec<JobHandle> = Vec::with_capacity(files.len());
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        match pool.submit(file.clone(), request.clone()).await {
            Ok(handle) => handles.push(handle),
            Err(e) => results.push((file, Err(e))),
        }
    }

    for handle in handles {
        let input = handle.input().to_path_buf();
        results.push((input, handle.outcome().await));
    }
    results
}
