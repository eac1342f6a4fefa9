//! Snapshot store trait and an in-memory implementation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::SnapshotError;
use crate::items::Item;

/// Persists the item list between cycles.
///
/// `save` replaces the whole snapshot; it must either fully succeed or leave
/// the previous snapshot intact.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the last saved list, or an empty list when none exists yet.
    async fn load(&self) -> Result<Vec<Item>, SnapshotError>;

    async fn save(&self, items: &[Item]) -> Result<(), SnapshotError>;
}

/// In-memory store for tests and dry runs.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    items: Arc<Mutex<Vec<Item>>>,
    saves: Arc<AtomicUsize>,
    fail_on_load: Arc<AtomicBool>,
    fail_on_save: Arc<AtomicBool>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let store = Self::default();
        *store.items.lock().unwrap() = items;
        store
    }

    /// Current contents.
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_on_load(&self, fail: bool) {
        self.fail_on_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Vec<Item>, SnapshotError> {
        if self.fail_on_load.load(Ordering::SeqCst) {
            return Err(SnapshotError::Corrupt("simulated load failure".to_string()));
        }
        Ok(self.items())
    }

    async fn save(&self, items: &[Item]) -> Result<(), SnapshotError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(SnapshotError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "simulated save failure",
            )));
        }
        *self.items.lock().unwrap() = items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
