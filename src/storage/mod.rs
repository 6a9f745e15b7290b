//! Storage layer for Tally
//!
//! Key-value snapshot stores (in memory or a single JSON file written
//! atomically) and the snapshot format the ledger is saved in.

pub mod file_io;
pub mod snapshot;
pub mod store;

pub use file_io::{read_json, write_json_atomic};
pub use snapshot::{load_snapshot, save_snapshot, SNAPSHOT_KEYS};
pub use store::{FileStore, MemoryStore, SnapshotStore};
