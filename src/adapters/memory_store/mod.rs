// Memory store adapter - Snapshot persistence held in process memory

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::PersistenceError;
use crate::ports::SnapshotPort;

/// In-memory snapshot store for tests and ephemeral sessions
#[derive(Default)]
pub struct InMemorySnapshotStore {
    contents: Mutex<Option<String>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out holding `contents`
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with an I/O error
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved snapshot
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotPort for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.contents())
    }

    async fn save(&self, contents: &str) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                path: "<memory>".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "saves disabled"),
            });
        }
        if let Ok(mut slot) = self.contents.lock() {
            *slot = Some(contents.to_string());
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
