//! Snapshot stored in a SQLite table, one JSON row per item.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection};

use listwatch_core::errors::SnapshotError;
use listwatch_core::snapshot::SnapshotStore;
use listwatch_core::Item;

use crate::errors::StorageError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS snapshot_items (
    position INTEGER PRIMARY KEY,
    item_json TEXT NOT NULL
)";

/// SQLite-backed snapshot store.
///
/// Rows are keyed by list position so load order matches save order. A save
/// replaces every row inside one transaction. Calls run on tokio's blocking
/// pool against a single shared connection.
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let conn = Connection::open(path).map_err(StorageError::from)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, SnapshotError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, SnapshotError> {
        conn.execute_batch(CREATE_TABLE)
            .map_err(StorageError::from)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, job: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StorageError::LockPoisoned)?;
            job(&mut guard)
        })
        .await?
    }
}

fn load_items(conn: &mut Connection) -> Result<Vec<Item>, StorageError> {
    let mut stmt = conn.prepare("SELECT item_json FROM snapshot_items ORDER BY position")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut items = Vec::new();
    for row in rows {
        items.push(serde_json::from_str(&row?)?);
    }
    Ok(items)
}

fn replace_items(conn: &mut Connection, rows: Vec<String>) -> Result<(), StorageError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM snapshot_items", [])?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO snapshot_items (position, item_json) VALUES (?1, ?2)")?;
        for (position, json) in rows.iter().enumerate() {
            stmt.execute(params![position as i64, json])?;
        }
    }
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self) -> Result<Vec<Item>, SnapshotError> {
        let items = self.with_conn(load_items).await?;
        debug!("Loaded {} item(s) from SQLite snapshot", items.len());
        Ok(items)
    }

    async fn save(&self, items: &[Item]) -> Result<(), SnapshotError> {
        // Serialize up front so a bad item fails before the table is touched.
        let rows = items
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        let count = rows.len();

        self.with_conn(move |conn| replace_items(conn, rows)).await?;
        debug!("Saved {} item(s) to SQLite snapshot", count);
        Ok(())
    }
}
