//! Storage abstraction layer for Scriba.
//!
//! Provides the [`KeyValueStore`] trait: the narrow string-keyed,
//! string-valued contract the session and draft layers persist through.
//! It stands in for the browser's session and local storage, so the
//! logic above it can be exercised against [`MemoryStorage`] in tests.
//!
//! # Feature Flags
//!
//! - `fs` (default): [`FileStorage`], one file per key under a directory

mod error;
#[cfg(feature = "fs")]
mod file;
mod memory;

pub use error::StorageError;
#[cfg(feature = "fs")]
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A string key/value store.
///
/// Implementations must be safe to share between the session manager
/// and the draft store (`Arc<dyn KeyValueStore>`). Calls are synchronous:
/// like browser storage, a read or write completes before returning.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Joins a namespace and a suffix the way every Scriba key is built:
/// `"<namespace>::<suffix>"`.
pub fn scoped_key(namespace: &str, suffix: &str) -> String {
    format!("{namespace}::{suffix}")
}
