//! Bounded worker pool for batch conversions
//!
//! Submissions go through a bounded queue drained by a fixed number of
//! workers. Each file runs probe -> plan -> execute on its own; files never
//! share state, so the pool is nothing more than repeated independent
//! invocation with limited concurrency.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::convert_interactor::{ConversionOutcome, ConvertInteractor};
use crate::domain::errors::{DomainError, ExecutionError};
use crate::domain::model::ConversionRequest;
use crate::engine::ProgressCallback;
use crate::ports::{CancelHandle, CancelToken};

type JobResult = Result<ConversionOutcome, DomainError>;

struct QueuedJob {
    input: PathBuf,
    request: ConversionRequest,
    cancel: CancelToken,
    reply: oneshot::Sender<JobResult>,
}

/// Handle to one submitted conversion
#[derive(Debug)]
pub struct JobHandle {
    input: PathBuf,
    cancel: CancelHandle,
    reply: oneshot::Receiver<JobResult>,
}

impl JobHandle {
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Cancel this conversion, whether queued or running
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the conversion to finish
    pub async fn outcome(self) -> JobResult {
        // Keep the cancel handle alive until the worker has answered
        let JobHandle { cancel, reply, .. } = self;
        let result = reply.await.unwrap_or_else(|_| {
            Err(DomainError::Execution(ExecutionError::Failed {
                code: None,
                message: "worker stopped before finishing the job".to_string(),
            }))
        });
        drop(cancel);
        result
    }
}

/// Fixed-size pool of conversion workers
pub struct WorkerPool {
    sender: mpsc::Sender<QueuedJob>,
    workers: Vec<JoinHandle<()>>,
    cancel_root: CancelHandle,
    root: CancelToken,
}

impl WorkerPool {
    /// Spawn `worker_count` workers behind a queue of `queue_capacity` jobs
    pub fn new(
        interactor: Arc<ConvertInteractor>,
        progress: Arc<dyn ProgressCallback>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let (cancel_root, root) = CancelHandle::pair();

        let workers = (0..worker_count)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&interactor),
                    Arc::clone(&progress),
                ))
            })
            .collect();

        info!("Started {} conversion workers", worker_count);
        Self {
            sender,
            workers,
            cancel_root,
            root,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a conversion; waits while the queue is full
    pub async fn submit(&self, input: PathBuf, request: ConversionRequest) -> Result<JobHandle, DomainError> {
        let (cancel, token) = CancelHandle::child_of(&self.root);
        let (reply_tx, reply_rx) = oneshot::channel();

        debug!("Queueing {}", input.display());
        self.sender
            .send(QueuedJob {
                input: input.clone(),
                request,
                cancel: token,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DomainError::BadArgs("Conversion queue is closed".to_string()))?;

        Ok(JobHandle {
            input,
            cancel,
            reply: reply_rx,
        })
    }

    /// Cancel every queued and running conversion
    pub fn cancel_all(&self) {
        info!("Cancelling all conversions");
        self.cancel_root.cancel();
    }

    /// Stop accepting jobs and wait for the workers to drain the queue
    pub async fn shutdown(self) {
        let WorkerPool { sender, workers, .. } = self;
        drop(sender);
        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Conversion worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
    interactor: Arc<ConvertInteractor>,
    progress: Arc<dyn ProgressCallback>,
) {
    debug!("Worker {} started", id);

    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else { break };

        let result = if job.cancel.is_cancelled() {
            Err(DomainError::Execution(ExecutionError::Cancelled))
        } else {
            debug!("Worker {} converting {}", id, job.input.display());
            interactor
                .convert(&job.input, &job.request, Arc::clone(&progress), job.cancel)
                .await
        };

        if job.reply.send(result).is_err() {
            debug!("Result for {} was not awaited", job.input.display());
        }
    }

    debug!("Worker {} stopped", id);
}
