// Convert interactor - Orchestrates the probe -> plan -> execute use case

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{CommandBuilder, ProgressCallback};
use crate::output::{OutputNamer, OutputReservations};
use crate::planner::ConversionPlanner;
use crate::ports::*;

/// Read-only answer to "what would converting this file do?"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPreview {
    pub source: MediaDescriptor,
    pub directive: ConversionDirective,
    pub decision: ScaleDecision,
    pub output_path: PathBuf,
}

/// Result of one finished conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub directive: ConversionDirective,
    pub decision: ScaleDecision,
    pub elapsed: Duration,
}

/// Interactor for the conversion use case
pub struct ConvertInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    history_port: Option<Arc<dyn HistoryPort>>,
    planner: ConversionPlanner,
    commands: CommandBuilder,
    namer: OutputNamer,
    reservations: OutputReservations,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        commands: CommandBuilder,
        namer: OutputNamer,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            history_port: None,
            planner: ConversionPlanner::new(),
            commands,
            namer,
            reservations: OutputReservations::new(),
        }
    }

    /// Record converted outputs into `history`
    pub fn with_history(mut self, history: Arc<dyn HistoryPort>) -> Self {
        self.history_port = Some(history);
        self
    }

    /// Probe only
    pub async fn inspect(&self, input: &Path) -> Result<MediaDescriptor, DomainError> {
        Ok(self.probe_port.probe(input).await?)
    }

    /// Probe and plan without executing anything
    pub async fn preview(&self, input: &Path, request: &ConversionRequest) -> Result<ConversionPreview, DomainError> {
        let source = self.inspect(input).await?;
        let directive = self.planner.plan_request(&source, request)?;
        let decision = ScaleDecision::classify(source.dimensions(), &directive);
        let output_path = self.namer.output_path(input, source.dimensions(), &directive);

        debug!("Preview for {}: {} ({})", input.display(), directive, decision.description());
        Ok(ConversionPreview {
            source,
            directive,
            decision,
            output_path,
        })
    }

    /// Transcoder arguments for a previewed conversion
    pub fn command_line(&self, input: &Path, preview: &ConversionPreview) -> Result<Vec<String>, DomainError> {
        Ok(self
            .commands
            .materialize(&preview.directive, input, &preview.output_path)?)
    }

    /// Probe, plan, materialize and execute one conversion.
    ///
    /// Planning and materialization failures stop before the transcoder is
    /// started. Each output path is claimed for the lifetime of the
    /// interactor, so a second input naming the same output is written to a
    /// numbered variant instead. A successful conversion is recorded in the
    /// history; failing to record it is logged and otherwise ignored.
    pub async fn convert(
        &self,
        input: &Path,
        request: &ConversionRequest,
        progress: Arc<dyn ProgressCallback>,
        cancel: CancelToken,
    ) -> Result<ConversionOutcome, DomainError> {
        let mut preview = self.preview(input, request).await?;

        let claimed = self.reservations.claim(&preview.output_path);
        if claimed != preview.output_path {
            warn!(
                "{} is already an output of this run, writing {} instead",
                preview.output_path.display(),
                claimed.display()
            );
            preview.output_path = claimed;
        }

        let report = match self.execute_preview(input, &preview, progress, cancel).await {
            Ok(report) => report,
            Err(e) => {
                self.reservations.release(&preview.output_path);
                return Err(e);
            }
        };

        if let Some(history) = &self.history_port {
            if let Err(e) = history.record_conversion(&report.output).await {
                warn!("Failed to record {} in history: {}", report.output.display(), e);
            }
        }

        Ok(ConversionOutcome {
            input: input.to_path_buf(),
            output: report.output,
            directive: preview.directive,
            decision: preview.decision,
            elapsed: report.elapsed,
        })
    }

    async fn execute_preview(
        &self,
        input: &Path,
        preview: &ConversionPreview,
        progress: Arc<dyn ProgressCallback>,
        cancel: CancelToken,
    ) -> Result<ExecutionReport, DomainError> {
        let args = self.command_line(input, preview)?;

        if let Some(dir) = preview.output_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| ExecutionError::Failed {
                code: None,
                message: format!("cannot create output directory {}: {}", dir.display(), e),
            })?;
        }

        info!(
            "Converting {} -> {} ({}, {})",
            input.display(),
            preview.output_path.display(),
            preview.directive.mode,
            preview.decision.description()
        );

        let job = ExecutionJob {
            input: input.to_path_buf(),
            output: preview.output_path.clone(),
            args,
            duration: preview.source.duration,
        };
        Ok(self.execute_port.execute(&job, progress, cancel).await?)
    }
}
