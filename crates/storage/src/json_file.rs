//! Snapshot stored as a pretty-printed JSON array on disk.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};

use listwatch_core::errors::SnapshotError;
use listwatch_core::snapshot::SnapshotStore;
use listwatch_core::Item;

/// JSON file store compatible with the historical `tournaments.json` layout.
///
/// A missing or blank file loads as an empty snapshot. Saves go to a sibling
/// temp file that is then renamed over the target, so a crash mid-write
/// leaves the previous snapshot in place.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_default());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self) -> Result<Vec<Item>, SnapshotError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No snapshot at {}, starting from an empty one",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(SnapshotError::Io(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let items: Vec<Item> = serde_json::from_slice(&bytes)?;
        debug!("Loaded {} item(s) from {}", items.len(), self.path.display());
        Ok(items)
    }

    async fn save(&self, items: &[Item]) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(items)?;
        let temp = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&temp, &json).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(SnapshotError::Io(e));
        }

        debug!("Saved {} item(s) to {}", items.len(), self.path.display());
        Ok(())
    }
}
