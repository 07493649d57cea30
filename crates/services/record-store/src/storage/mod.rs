//! Key-value backends the record store persists into.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// String-keyed, string-valued persistent storage.
///
/// Writes replace the whole value; there is no partial update and no
/// compare-and-swap. Concurrent writers resolve last-writer-wins.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` when absent
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> AppResult<()>;
}
