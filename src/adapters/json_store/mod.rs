// JSON store adapter - Snapshot persistence in a single JSON file

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::PersistenceError;
use crate::output::write_atomic;
use crate::ports::SnapshotPort;

/// File name of the snapshot inside the data directory
pub const SNAPSHOT_FILE_NAME: &str = "state.json";

/// Snapshot store backed by one JSON file, replaced atomically on save
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/state.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotPort for JsonFileSnapshotStore {
    async fn load(&self) -> Result<Option<String>, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                debug!("Loaded snapshot from {}", self.path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn save(&self, contents: &str) -> Result<(), PersistenceError> {
        let path = self.path.clone();
        let bytes = contents.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| self.io_error(std::io::Error::new(ErrorKind::Other, e)))?
            .map_err(|e| self.io_error(e))
    }
}
