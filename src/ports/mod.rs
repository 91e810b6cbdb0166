// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::ProgressCallback;
use crate::error::ConvertXResult;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Read the resolution and container of a media file
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError>;
}

/// One materialized conversion, ready to hand to the transcoder
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Transcoder arguments, without the program name
    pub args: Vec<String>,
    /// Input duration in seconds, used for percentages
    pub duration: Option<f64>,
}

/// What a successful execution reports back
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Port for running the external transcoder
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run one job to completion, failure or cancellation
    async fn execute(
        &self,
        job: &ExecutionJob,
        progress: Arc<dyn ProgressCallback>,
        cancel: CancelToken,
    ) -> Result<ExecutionReport, ExecutionError>;
}

/// Sending half of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle together with a token observing it
    pub fn pair() -> (Self, CancelToken) {
        let (sender, receiver) = watch::channel(false);
        let token = CancelToken {
            own: receiver,
            parent: None,
        };
        (Self { sender }, token)
    }

    /// Create a handle whose token also observes `parent`
    pub fn child_of(parent: &CancelToken) -> (Self, CancelToken) {
        let (handle, mut token) = Self::pair();
        token.parent = Some(parent.own.clone());
        (handle, token)
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Receiving half of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    own: watch::Receiver<bool>,
    parent: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self {
            own: receiver,
            parent: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.own.borrow() || self.parent.as_ref().is_some_and(|parent| *parent.borrow())
    }

    /// Resolve once cancellation has been requested
    pub async fn cancelled(&self) {
        match &self.parent {
            Some(parent) => {
                tokio::select! {
                    _ = wait_for_cancel(self.own.clone()) => {}
                    _ = wait_for_cancel(parent.clone()) => {}
                }
            }
            None => wait_for_cancel(self.own.clone()).await,
        }
    }
}

async fn wait_for_cancel(mut receiver: watch::Receiver<bool>) {
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        // Sender gone without cancelling: this token can never fire
        std::future::pending::<()>().await;
    }
}

/// A file remembered by the history store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub path: PathBuf,
    pub recorded_at: DateTime<Utc>,
}

/// Recent downloads and converted files, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub recent_downloads: Vec<HistoryEntry>,
    #[serde(default)]
    pub converted_files: Vec<HistoryEntry>,
}

/// Port for remembering files across sessions.
///
/// Loaded on start, saved on every change. The conversion engine never
/// touches it; only the application layer records into it.
#[async_trait]
pub trait HistoryPort: Send + Sync {
    /// Current contents
    async fn load(&self) -> ConvertXResult<History>;

    /// Remember a completed download (or an imported file)
    async fn record_download(&self, path: &Path) -> ConvertXResult<()>;

    /// Remember a converted output file
    async fn record_conversion(&self, path: &Path) -> ConvertXResult<()>;

    /// Forget all recent downloads
    async fn clear_downloads(&self) -> ConvertXResult<()>;

    /// Forget all converted files
    async fn clear_conversions(&self) -> ConvertXResult<()>;
}
