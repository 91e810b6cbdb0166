use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{AppConfig, FFmpegAdapter, FFprobeAdapter, JsonHistoryStore, ToolLocator};
use crate::app::convert_interactor::ConvertInteractor;
use crate::app::worker_pool::WorkerPool;
use crate::engine::{CommandBuilder, ProgressCallback};
use crate::error::ConvertXResult;
use crate::output::OutputConfig;
use crate::ports::{ExecutePort, HistoryPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
    fn history(&self) -> Arc<dyn HistoryPort>;
}

/// Wires the ffprobe/ffmpeg adapters and the JSON history store together
pub struct DefaultAppContainer {
    config: AppConfig,
    convert_interactor: Arc<ConvertInteractor>,
    history: Arc<dyn HistoryPort>,
    history_path: PathBuf,
}

impl DefaultAppContainer {
    /// Build every adapter from `config`; `history_path` is where the
    /// history file lives
    pub async fn new(config: AppConfig, history_path: PathBuf) -> ConvertXResult<Self> {
        let locator = ToolLocator::new(config.tools.ffmpeg_dir.clone());
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(locator.clone()));
        let execute_port: Arc<dyn ExecutePort> = Arc::new(FFmpegAdapter::new(locator));

        debug!("Opening history at {}", history_path.display());
        let history: Arc<dyn HistoryPort> =
            Arc::new(JsonHistoryStore::open(&history_path, config.history.max_entries).await?);

        let output = OutputConfig {
            output_dir: config.conversion.output_dir.clone(),
        };
        let convert_interactor = Arc::new(
            ConvertInteractor::new(
                probe_port,
                execute_port,
                CommandBuilder::new(config.engine_config()),
                output.namer(),
            )
            .with_history(Arc::clone(&history)),
        );

        Ok(Self {
            config,
            convert_interactor,
            history,
            history_path,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn history_path(&self) -> &std::path::Path {
        &self.history_path
    }

    /// Worker pool sized from the `[workers]` section
    pub fn worker_pool(&self, progress: Arc<dyn ProgressCallback>) -> WorkerPool {
        WorkerPool::new(
            Arc::clone(&self.convert_interactor),
            progress,
            self.config.workers.count,
            self.config.workers.queue_capacity,
        )
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }

    fn history(&self) -> Arc<dyn HistoryPort> {
        Arc::clone(&self.history)
    }
}
