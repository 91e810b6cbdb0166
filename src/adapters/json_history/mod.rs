//! JSON file backed history of recent downloads and converted files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ConvertXError, ConvertXResult};
use crate::ports::{History, HistoryEntry, HistoryPort};

/// History store persisted as a single JSON document.
///
/// The file is read once when the store is opened and rewritten after every
/// change. Each list is de-duplicated by path, most recent first, and capped
/// at `max_entries`.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    max_entries: usize,
    state: Mutex<History>,
}

impl JsonHistoryStore {
    /// Open the store at `path`; a missing file starts an empty history
    pub async fn open(path: impl Into<PathBuf>, max_entries: usize) -> ConvertXResult<Self> {
        let path = path.into();
        let history = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => History::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| ConvertXError::History {
                message: format!("corrupt history file {}: {}", path.display(), e),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {}, starting empty", path.display());
                History::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            max_entries: max_entries.max(1),
            state: Mutex::new(history),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update<F>(&self, change: F) -> ConvertXResult<()>
    where
        F: FnOnce(&mut History) + Send,
    {
        let mut state = self.state.lock().await;
        change(&mut state);
        self.persist(&state).await
    }

    async fn persist(&self, history: &History) -> ConvertXResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(history)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            warn!("Failed to save history to {}: {}", self.path.display(), e);
            ConvertXError::History {
                message: format!("failed to write {}: {}", self.path.display(), e),
            }
        })
    }
}

/// Put `path` at the front of `entries`, dropping older copies and overflow
fn remember(entries: &mut Vec<HistoryEntry>, path: &Path, max_entries: usize) {
    entries.retain(|entry| entry.path != path);
    entries.insert(
        0,
        HistoryEntry {
            path: path.to_path_buf(),
            recorded_at: Utc::now(),
        },
    );
    entries.truncate(max_entries);
}

#[async_trait]
impl HistoryPort for JsonHistoryStore {
    async fn load(&self) -> ConvertXResult<History> {
        Ok(self.state.lock().await.clone())
    }

    async fn record_download(&self, path: &Path) -> ConvertXResult<()> {
        let max = self.max_entries;
        self.update(|history| remember(&mut history.recent_downloads, path, max))
            .await
    }

    async fn record_conversion(&self, path: &Path) -> ConvertXResult<()> {
        let max = self.max_entries;
        self.update(|history| remember(&mut history.converted_files, path, max))
            .await
    }

    async fn clear_downloads(&self) -> ConvertXResult<()> {
        self.update(|history| history.recent_downloads.clear()).await
    }

    async fn clear_conversions(&self) -> ConvertXResult<()> {
        self.update(|history| history.converted_files.clear()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(entries: &[HistoryEntry]) -> Vec<&Path> {
        entries.iter().map(|entry| entry.path.as_path()).collect()
    }

    #[tokio::test]
    async fn test_records_most_recent_first_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::open(dir.path().join("history.json"), 10)
            .await
            .unwrap();

        store.record_download(Path::new("a.mp4")).await.unwrap();
        store.record_download(Path::new("b.mp4")).await.unwrap();
        store.record_download(Path::new("a.mp4")).await.unwrap();

        let history = store.load().await.unwrap();
        assert_eq!(
            paths(&history.recent_downloads),
            vec![Path::new("a.mp4"), Path::new("b.mp4")]
        );
        assert!(history.converted_files.is_empty());
    }

    #[tokio::test]
    async fn test_caps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::open(dir.path().join("history.json"), 2)
            .await
            .unwrap();

        for name in ["1.mkv", "2.mkv", "3.mkv"] {
            store.record_conversion(Path::new(name)).await.unwrap();
        }

        let history = store.load().await.unwrap();
        assert_eq!(
            paths(&history.converted_files),
            vec![Path::new("3.mkv"), Path::new("2.mkv")]
        );
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("state").join("history.json");

        {
            let store = JsonHistoryStore::open(&file, 50).await.unwrap();
            store.record_download(Path::new("song.mp3")).await.unwrap();
            store.record_conversion(Path::new("song.flac")).await.unwrap();
            store.clear_downloads().await.unwrap();
        }

        let reopened = JsonHistoryStore::open(&file, 50).await.unwrap();
        let history = reopened.load().await.unwrap();
        assert!(history.recent_downloads.is_empty());
        assert_eq!(paths(&history.converted_files), vec![Path::new("song.flac")]);

        reopened.clear_conversions().await.unwrap();
        let cleared = JsonHistoryStore::open(&file, 50).await.unwrap();
        assert_eq!(cleared.load().await.unwrap(), History::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("history.json");
        std::fs::write(&file, b"{not json").unwrap();

        let result = JsonHistoryStore::open(&file, 50).await;
        assert!(matches!(result, Err(ConvertXError::History { .. })));
    }
}
