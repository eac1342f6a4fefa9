//! Listwatch Storage - snapshot store implementations.
//!
//! Implements the core `SnapshotStore` trait on a JSON file and on SQLite.

pub mod errors;
mod json_file;
mod sqlite;

pub use errors::StorageError;
pub use json_file::JsonFileSnapshotStore;
pub use sqlite::SqliteSnapshotStore;
