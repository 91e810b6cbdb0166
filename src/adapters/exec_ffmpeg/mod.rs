//! FFmpeg execution adapter
//!
//! Runs the transcoder as a child process, feeds its `-progress pipe:1`
//! stream into the progress callback and kills it on cancellation.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::adapters::tool_locator::{Tool, ToolLocator};
use crate::domain::errors::*;
use crate::engine::{ProgressCallback, ProgressParser};
use crate::ports::*;

/// Number of stderr lines kept for failure reports
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    locator: ToolLocator,
    program: Option<PathBuf>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            program: None,
        }
    }

    /// Run `program` instead of the located ffmpeg
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            locator: ToolLocator::default(),
            program: Some(program.into()),
        }
    }

    fn program(&self) -> Result<PathBuf, ExecutionError> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        self.locator
            .locate(Tool::Ffmpeg)
            .ok_or_else(|| ExecutionError::ToolNotFound {
                tool: Tool::Ffmpeg.name().to_string(),
            })
    }

    async fn run(
        &self,
        job: &ExecutionJob,
        progress: &dyn ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<ExecutionReport, ExecutionError> {
        let program = self.program()?;
        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        debug!("Running {} {}", program.display(), job.args.join(" "));
        let started = Instant::now();
        let mut child = Command::new(&program)
            .args(&job.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::Failed {
                code: None,
                message: format!("failed to spawn {}: {}", program.display(), e),
            })?;

        progress.on_start(&job.input, &job.output);

        let stdout = child.stdout.take().ok_or_else(|| ExecutionError::Failed {
            code: None,
            message: "transcoder stdout was not captured".to_string(),
        })?;
        let stderr_tail = child.stderr.take().map(|stderr| tokio::spawn(collect_tail(stderr)));

        let mut lines = BufReader::new(stdout).lines();
        let mut parser = ProgressParser::new(job.duration);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancelling conversion of {}", job.input.display());
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill transcoder: {}", e);
                    }
                    return Err(ExecutionError::Cancelled);
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Some(update) = parser.feed_line(&line) {
                            progress.on_progress(&job.input, &update);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Stopped reading transcoder progress: {}", e);
                        break;
                    }
                }
            }
        }

        let waited = tokio::select! {
            _ = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let status = match waited {
            Some(status) => status.map_err(|e| ExecutionError::Failed {
                code: None,
                message: format!("failed to wait for transcoder: {}", e),
            })?,
            None => {
                info!("Cancelling conversion of {}", job.input.display());
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill transcoder: {}", e);
                }
                return Err(ExecutionError::Cancelled);
            }
        };

        if !status.success() {
            let tail = match stderr_tail {
                Some(handle) => handle.await.unwrap_or_default(),
                None => String::new(),
            };
            return Err(ExecutionError::Failed {
                code: status.code(),
                message: if tail.is_empty() {
                    format!("transcoder exited with {}", status)
                } else {
                    tail
                },
            });
        }

        Ok(ExecutionReport {
            output: job.output.clone(),
            elapsed: started.elapsed(),
        })
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn execute(
        &self,
        job: &ExecutionJob,
        progress: Arc<dyn ProgressCallback>,
        cancel: CancelToken,
    ) -> Result<ExecutionReport, ExecutionError> {
        let result = self.run(job, progress.as_ref(), &cancel).await;
        match &result {
            Ok(report) => {
                info!(
                    "Finished {} in {:.2}s",
                    report.output.display(),
                    report.elapsed.as_secs_f64()
                );
                progress.on_complete(&job.input, &job.output);
            }
            Err(e) => progress.on_error(&job.input, &e.to_string()),
        }
        result
    }
}

/// Drain a pipe, keeping only its last lines
async fn collect_tail<R: AsyncRead + Unpin>(reader: R) -> String {
    let mut lines = BufReader::new(reader).lines();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}
