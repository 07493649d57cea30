//! Record Store Library
//!
//! Sole source of truth for the portal: users, resident profiles, messages
//! and billing history, persisted as one JSON blob in a key-value backend.

pub mod database;
pub mod seed;
pub mod storage;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use common::AppResult;

pub use database::Database;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::RecordStore;

#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockKeyValueStore;

/// Open the file-backed store under `data_dir`, seeding it on first use.
///
/// Returns the store together with the shared backend so the session guard
/// can persist next to it.
pub fn open_file_store(
    data_dir: impl Into<PathBuf>,
) -> AppResult<(Arc<RecordStore>, Arc<dyn KeyValueStore>)> {
    let backend = FileStore::new(data_dir);
    info!(dir = %backend.dir().display(), "opening portal data directory");

    let storage: Arc<dyn KeyValueStore> = Arc::new(backend);
    let store = RecordStore::open(Arc::clone(&storage))?;
    Ok((Arc::new(store), storage))
}
